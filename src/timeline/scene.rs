use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: f64,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            kind: "fade".to_owned(),
            duration: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneAudio {
    pub narration: Option<String>,
    pub background_music: Option<String>,
    pub volume: f64,
}

impl Default for SceneAudio {
    fn default() -> Self {
        Self {
            narration: None,
            background_music: None,
            volume: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneElementKind {
    #[default]
    Text,
    Image,
    Shape,
    Chart,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[default]
    None,
    Fade,
    Slide,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animation {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneStyle {
    /// Pixels.
    pub font_size: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub opacity: f64,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            color: "#000000".to_owned(),
            background_color: None,
            bold: false,
            italic: false,
            opacity: 1.0,
        }
    }
}

/// One drawable item of a scene; geometry is in output pixels.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SceneElementKind,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub style: SceneStyle,
    /// `data:` URI for image elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    pub animation: Animation,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Seconds.
    pub duration: f64,
    pub transition: Transition,
    /// CSS hex color.
    pub background: String,
    pub elements: Vec<SceneElement>,
    pub audio: SceneAudio,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            content: String::new(),
            duration: 5.0,
            transition: Transition::default(),
            background: "#FFFFFF".to_owned(),
            elements: Vec::new(),
            audio: SceneAudio::default(),
        }
    }
}

fn finite(v: f64, what: &str, scene: &str) -> ReelResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ReelError::validation(format!(
            "scene '{scene}': {what} must be finite"
        )))
    }
}

/// Reject timelines the synthesizer cannot lay out.
pub fn validate_scenes(scenes: &[Scene]) -> ReelResult<()> {
    for scene in scenes {
        finite(scene.duration, "duration", &scene.id)?;
        if scene.duration < 0.0 {
            return Err(ReelError::validation(format!(
                "scene '{}': duration must be >= 0",
                scene.id
            )));
        }
        for el in &scene.elements {
            for (v, what) in [
                (el.x, "x"),
                (el.y, "y"),
                (el.width, "width"),
                (el.height, "height"),
                (el.style.font_size, "fontSize"),
                (el.style.opacity, "opacity"),
            ] {
                finite(v, what, &scene.id)?;
            }
        }
    }
    Ok(())
}

/// Parse a JSON array of scenes.
pub fn scenes_from_json(text: &str) -> ReelResult<Vec<Scene>> {
    let scenes: Vec<Scene> =
        serde_json::from_str(text).map_err(|e| ReelError::serde(format!("timeline json: {e}")))?;
    validate_scenes(&scenes)?;
    Ok(scenes)
}

pub fn scenes_to_json(scenes: &[Scene]) -> ReelResult<String> {
    serde_json::to_string_pretty(scenes).map_err(|e| ReelError::serde(e.to_string()))
}

/// Sum of scene durations in seconds.
pub fn total_duration(scenes: &[Scene]) -> f64 {
    scenes.iter().map(|s| s.duration.max(0.0)).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scene.rs"]
mod tests;
