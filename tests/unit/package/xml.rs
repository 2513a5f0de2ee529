use super::*;

const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp>
      <p:spPr><a:xfrm><a:off x="914400" y="0"/><a:ext cx="10" cy="20"/></a:xfrm></p:spPr>
      <p:txBody><a:p><a:r><a:t>Fish &amp; chips</a:t></a:r><a:r><a:t> today</a:t></a:r></a:p></p:txBody>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

#[test]
fn builds_tree_with_qualified_and_local_lookup() {
    let root = parse_xml(SLIDE).unwrap();
    assert_eq!(root.name, "p:sld");
    assert_eq!(root.local_name(), "sld");

    let tree = root.path(&["p:cSld", "p:spTree"]).unwrap();
    let sp = tree.child("sp").unwrap();
    let off = sp.path(&["p:spPr", "a:xfrm", "a:off"]).unwrap();
    assert_eq!(off.attr_i64("x"), Some(914_400));
    assert_eq!(off.attr("y"), Some("0"));
    assert!(sp.path(&["p:spPr", "p:xfrm"]).is_none());
}

#[test]
fn text_is_unescaped_and_whitespace_preserved() {
    let root = parse_xml(SLIDE).unwrap();
    assert_eq!(joined_text(&root, "a:t"), "Fish & chips today");
    assert_eq!(root.descendants("a:r").len(), 2);
    assert_eq!(root.first_descendant("a:t").unwrap().text, "Fish & chips");
}

#[test]
fn malformed_documents_are_rejected() {
    assert!(matches!(parse_xml("<a><b></a>"), Err(ReelError::Xml(_))));
    assert!(matches!(parse_xml("<a>"), Err(ReelError::Xml(_))));
    assert!(matches!(parse_xml(""), Err(ReelError::Xml(_))));
    assert!(matches!(parse_xml("<a/><b/>"), Err(ReelError::Xml(_))));
    assert!(check_well_formed("<?xml version=\"1.0\"?>\n<ok x=\"1\"/>\n").is_ok());
}
