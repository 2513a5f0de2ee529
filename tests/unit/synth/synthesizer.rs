use super::*;

use crate::timeline::scene::{SceneElement, SceneElementKind};

fn canvas() -> Canvas {
    Canvas::new(32, 18).unwrap()
}

fn fps() -> Fps {
    Fps::integer(30).unwrap()
}

fn shape_scene(id: &str, duration: f64, bg: &str) -> Scene {
    Scene {
        id: id.into(),
        duration,
        background: bg.into(),
        elements: vec![SceneElement {
            id: format!("{id}-box"),
            kind: SceneElementKind::Shape,
            x: 4.0,
            y: 4.0,
            width: 10.0,
            height: 10.0,
            ..SceneElement::default()
        }],
        ..Scene::default()
    }
}

#[test]
fn frame_count_and_timestamps_follow_fps() {
    let scenes = [shape_scene("a", 0.1, "#000000"), shape_scene("b", 0.2, "#ffffff")];
    let frames = synthesize(&scenes, fps(), canvas(), None, &SynthOptions::default(), None).unwrap();
    assert_eq!(frames.len(), 9);
    for (i, f) in frames.iter().enumerate() {
        assert_eq!(f.index, i as u64);
        assert!((f.timestamp_seconds - i as f64 / 30.0).abs() < 1e-12);
        assert!(f.image_bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}

#[test]
fn parallel_and_sequential_output_match() {
    let scenes = [shape_scene("a", 0.5, "#223344")];
    let par = synthesize(
        &scenes,
        fps(),
        canvas(),
        None,
        &SynthOptions {
            chunk_size: 4,
            ..SynthOptions::default()
        },
        None,
    )
    .unwrap();
    let seq = synthesize(
        &scenes,
        fps(),
        canvas(),
        None,
        &SynthOptions {
            parallel: false,
            chunk_size: 7,
            threads: None,
        },
        None,
    )
    .unwrap();
    assert_eq!(par, seq);

    let single = synthesize_frame(&scenes, fps(), canvas(), FrameIndex(7)).unwrap();
    assert_eq!(single, par[7]);
}

#[test]
fn progress_is_monotonic_and_finishes() {
    let scenes = [shape_scene("a", 1.0, "#ffffff")];
    let mut seen = Vec::new();
    let mut sink = |p: f64| seen.push(p);
    let options = SynthOptions {
        chunk_size: 10,
        ..SynthOptions::default()
    };
    synthesize(&scenes, fps(), canvas(), None, &options, Some(&mut sink)).unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().copied(), Some(100.0));
    assert!(seen.len() >= 3);
}

#[test]
fn duration_override_extends_with_the_last_scene() {
    let scenes = [shape_scene("a", 0.1, "#ff0000")];
    let frames = synthesize(
        &scenes,
        fps(),
        canvas(),
        Some(0.5),
        &SynthOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(frames.len(), 15);
    let tail = image::load_from_memory(&frames[14].image_bytes)
        .unwrap()
        .to_rgba8();
    assert_eq!(tail.get_pixel(0, 0).0, [255, 0, 0, 255]);
}

#[test]
fn bad_inputs_are_rejected() {
    let scenes = [shape_scene("a", 1.0, "#ffffff")];
    let o = SynthOptions::default();
    assert!(synthesize(&scenes, fps(), canvas(), Some(f64::NAN), &o, None).is_err());
    assert!(synthesize(&scenes, fps(), canvas(), Some(-1.0), &o, None).is_err());

    let threads0 = SynthOptions {
        threads: Some(0),
        ..SynthOptions::default()
    };
    assert!(synthesize(&scenes, fps(), canvas(), None, &threads0, None).is_err());

    let mut bad = scenes[0].clone();
    bad.duration = f64::INFINITY;
    assert!(synthesize(&[bad], fps(), canvas(), None, &o, None).is_err());
}

#[test]
fn empty_timeline_renders_nothing() {
    let frames = synthesize(&[], fps(), canvas(), None, &SynthOptions::default(), None).unwrap();
    assert!(frames.is_empty());
}

#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn bad_colors_are_reported_once_per_timeline() {
    let mut scene = shape_scene("a", 0.5, "not-a-color");
    scene.elements[0].style.color = "#zzz".into();
    let mut second = scene.clone();
    second.id = "b".into();
    let scenes = [scene, second];
    assert_eq!(report_unparsable_colors(&scenes), 2);

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let frames = tracing::subscriber::with_default(subscriber, || {
        synthesize(&scenes, fps(), canvas(), None, &SynthOptions::default(), None)
    })
    .unwrap();
    assert_eq!(frames.len(), 30);

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(text.matches("unparsable color").count(), 2, "{text}");
}
