//! Scene timelines consumed by the frame synthesizer.

pub mod from_deck;
pub mod scene;

pub use from_deck::{TimelineOptions, data_uri_for, scenes_from_document};
pub use scene::{
    Animation, AnimationKind, Scene, SceneAudio, SceneElement, SceneElementKind, SceneStyle,
    Transition, scenes_from_json, scenes_to_json, total_duration, validate_scenes,
};
