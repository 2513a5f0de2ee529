use super::*;

#[test]
fn sparse_json_fills_defaults() {
    let scenes = scenes_from_json(
        r#"[{"id":"s1","duration":3,"elements":[{"id":"t","content":"Hi","x":10,"y":20,"width":300,"height":50,
            "animation":{"type":"slide","startX":-100}}]}]"#,
    )
    .unwrap();
    let s = &scenes[0];
    assert_eq!(s.duration, 3.0);
    assert_eq!(s.background, "#FFFFFF");
    assert_eq!(s.transition.kind, "fade");
    let el = &s.elements[0];
    assert_eq!(el.kind, SceneElementKind::Text);
    assert_eq!(el.style.font_size, 16.0);
    assert_eq!(el.style.opacity, 1.0);
    assert_eq!(el.animation.kind, AnimationKind::Slide);
    assert_eq!(el.animation.start_x, Some(-100.0));
    assert_eq!(el.animation.end_x, None);
}

#[test]
fn negative_duration_is_rejected() {
    let err = scenes_from_json(r#"[{"id":"bad","duration":-1}]"#).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert!(matches!(
        scenes_from_json("{not json").unwrap_err(),
        ReelError::Serde(_)
    ));
}

#[test]
fn json_round_trip_uses_camel_case() {
    let scene = Scene {
        id: "a".into(),
        elements: vec![SceneElement {
            id: "e".into(),
            style: SceneStyle {
                background_color: Some("#112233".into()),
                ..SceneStyle::default()
            },
            ..SceneElement::default()
        }],
        ..Scene::default()
    };
    let text = scenes_to_json(std::slice::from_ref(&scene)).unwrap();
    assert!(text.contains("backgroundColor"));
    assert!(text.contains("backgroundMusic"));
    assert_eq!(scenes_from_json(&text).unwrap(), vec![scene]);
}

#[test]
fn total_duration_ignores_negative_values() {
    let mk = |d: f64| Scene {
        duration: d,
        ..Scene::default()
    };
    assert_eq!(total_duration(&[mk(1.5), mk(2.0)]), 3.5);
    assert_eq!(total_duration(&[]), 0.0);
}
