use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(ReelError::archive("x").to_string().contains("archive error:"));
    assert!(ReelError::xml("x").to_string().contains("xml error:"));
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::render("x").to_string().contains("render error:"));
    assert!(ReelError::engine("x").to_string().contains("engine error:"));
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn parse_wrapper_keeps_root_cause() {
    use std::error::Error as _;

    let err = ReelError::archive("bad central directory").into_parse();
    let msg = err.to_string();
    assert!(msg.starts_with("file could not be processed:"));
    assert!(msg.contains("bad central directory"));

    let source = err.source().expect("parse error has a source");
    assert!(source.to_string().contains("archive error:"));
}

#[test]
fn wrapping_is_not_nested_twice() {
    let err = ReelError::engine("exit 1").into_encode().into_encode();
    let ReelError::Encode { source } = err else {
        panic!("expected encode error");
    };
    assert!(matches!(*source, ReelError::Engine(_)));

    let err = ReelError::xml("eof").into_parse().into_parse();
    let ReelError::Parse { source } = err else {
        panic!("expected parse error");
    };
    assert!(matches!(*source, ReelError::Xml(_)));
}
