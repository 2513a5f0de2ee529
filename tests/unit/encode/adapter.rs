use super::*;

use std::collections::BTreeMap;

#[derive(Default)]
struct FakeEngine {
    inits: usize,
    staged: BTreeMap<String, Vec<u8>>,
    jobs: Vec<EncodeJob>,
    cleanups: usize,
    fail_run: bool,
}

impl EncodeEngine for FakeEngine {
    fn init(&mut self) -> ReelResult<()> {
        self.inits += 1;
        Ok(())
    }

    fn write_input(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        self.staged.insert(name.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn run(&mut self, job: &EncodeJob, on_progress: &mut dyn FnMut(f64)) -> ReelResult<()> {
        self.jobs.push(job.clone());
        if self.fail_run {
            return Err(ReelError::engine("boom"));
        }
        on_progress(0.5);
        on_progress(1.0);
        self.staged.insert(job.output.clone(), b"VIDEO".to_vec());
        Ok(())
    }

    fn read_output(&mut self, name: &str) -> ReelResult<Vec<u8>> {
        self.staged
            .get(name)
            .cloned()
            .ok_or_else(|| ReelError::engine("no output"))
    }

    fn cleanup(&mut self) -> ReelResult<()> {
        self.cleanups += 1;
        self.staged.clear();
        Ok(())
    }
}

fn frames(n: u64) -> Vec<Frame> {
    let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([0, 0, 255, 255]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png).unwrap();
    let bytes = png.into_inner();
    (0..n)
        .map(|i| Frame {
            index: i,
            timestamp_seconds: i as f64 / 30.0,
            image_bytes: bytes.clone(),
        })
        .collect()
}

#[test]
fn render_runs_all_phases_and_cleans_up() {
    let mut adapter = EncoderAdapter::new(FakeEngine::default());
    assert_eq!(adapter.state(), EncodeState::Idle);

    let mut seen = Vec::new();
    let mut sink = |p: f64| seen.push(p);
    let video = adapter
        .render(&frames(90), None, &RenderRequest::default(), Some(&mut sink))
        .unwrap();

    assert_eq!(video.bytes, b"VIDEO");
    assert_eq!(video.frame_count, 90);
    assert!((video.duration_secs - 3.0).abs() < 1e-9);
    assert!(!video.thumbnail.is_empty());
    assert_eq!(adapter.state(), EncodeState::Done);

    let engine = adapter.engine();
    assert_eq!(engine.inits, 1);
    assert_eq!(engine.cleanups, 1);
    assert!(engine.staged.is_empty());
    let job = &engine.jobs[0];
    assert!(job.args.iter().any(|a| a == "scale=1280:720"));

    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.contains(&50.0));
    assert!(seen.contains(&70.0));
    assert!(seen.contains(&90.0));
    assert_eq!(seen.last().copied(), Some(100.0));
}

#[test]
fn init_is_idempotent_across_renders() {
    let mut adapter = EncoderAdapter::new(FakeEngine::default());
    adapter.init().unwrap();
    adapter.init().unwrap();
    adapter
        .render(&frames(3), Some(b"AUDIO"), &RenderRequest::default(), None)
        .unwrap();
    adapter
        .render(&frames(3), None, &RenderRequest::default(), None)
        .unwrap();
    assert_eq!(adapter.engine().inits, 1);
    assert_eq!(adapter.engine().jobs.len(), 2);
    assert!(adapter.engine().jobs[0].args.iter().any(|a| a == "audio.input"));
}

#[test]
fn engine_failure_is_wrapped_and_still_cleans_up() {
    let mut adapter = EncoderAdapter::new(FakeEngine {
        fail_run: true,
        ..FakeEngine::default()
    });
    let err = adapter
        .render(&frames(2), None, &RenderRequest::default(), None)
        .unwrap_err();
    assert!(matches!(err, ReelError::Encode { .. }));
    assert_eq!(adapter.state(), EncodeState::Failed);
    assert_eq!(adapter.engine().cleanups, 1);

    adapter.engine.fail_run = false;
    adapter
        .render(&frames(2), None, &RenderRequest::default(), None)
        .unwrap();
    assert_eq!(adapter.state(), EncodeState::Done);
}

#[test]
fn invalid_requests_fail_before_staging() {
    let mut adapter = EncoderAdapter::new(FakeEngine::default());
    let webm_h264 = RenderRequest {
        format: ContainerFormat::Webm,
        ..RenderRequest::default()
    };
    assert!(adapter.render(&frames(2), None, &webm_h264, None).is_err());
    assert!(adapter
        .render(&[], None, &RenderRequest::default(), None)
        .is_err());
    assert_eq!(adapter.engine().inits, 0);
    assert!(adapter.engine().jobs.is_empty());
    assert_eq!(adapter.state(), EncodeState::Failed);
}

#[test]
fn transitions_never_skip_preparing() {
    use EncodeState::*;
    assert!(Idle.can_transition(Preparing));
    assert!(!Idle.can_transition(Rendering));
    assert!(!Preparing.can_transition(Finalizing));
    assert!(Finalizing.can_transition(Done));
    assert!(Done.can_transition(Preparing));
    assert!(Rendering.can_transition(Failed));
    assert!(!Done.can_transition(Rendering));
}
