use super::*;

use std::io::{Cursor, Write};

use crate::package::archive::Archive;
use crate::package::rels::{RelationshipMap, parse_rels_part};

fn ctx_with(entries: &[(&str, &[u8])], slide_rels: Option<(u32, &str)>) -> ParseContext {
    let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        w.start_file(*name, opts).unwrap();
        w.write_all(data).unwrap();
    }
    let archive = Archive::open(w.finish().unwrap().into_inner()).unwrap();
    let mut rels = RelationshipMap::default();
    if let Some((n, xml)) = slide_rels {
        rels.insert_all(RelScope::Slide(n), parse_rels_part(xml, "ppt/slides").unwrap());
    }
    ParseContext::new(archive, rels, Vec::new())
}

fn sld(tree: &str) -> String {
    format!(
        r#"<p:sld xmlns:a="a" xmlns:p="p" xmlns:r="r"><p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{tree}</p:spTree></p:cSld></p:sld>"#
    )
}

const HELLO: &str = r#"<p:sp><p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="1828800" cy="914400"/></a:xfrm></p:spPr>
<p:txBody><a:p><a:r><a:rPr sz="2400" b="1" i="0"/><a:t>Hello</a:t></a:r></a:p></p:txBody></p:sp>"#;

const PIC: &str = r#"<p:pic><p:blipFill><a:blip r:embed="rId2"/></p:blipFill>
<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm></p:spPr></p:pic>"#;

const RELS: &str = r#"<Relationships><Relationship Id="rId2" Type="image" Target="../media/image1.png"/></Relationships>"#;

#[test]
fn text_shape_maps_emu_to_inches() {
    let ctx = ctx_with(&[("x", b"x")], None);
    let out = parse_slide(&ctx, 1, "ppt/slides/slide1.xml", &sld(HELLO)).unwrap();
    let SlideOutcome::Parsed(slide) = out else {
        panic!("expected clean parse");
    };
    assert_eq!(slide.id, "slide-1");
    assert_eq!(slide.content.len(), 1);
    let e = &slide.content[0];
    assert_eq!(e.kind, ElementKind::Text);
    assert_eq!(e.content.as_text(), Some("Hello"));
    assert_eq!(
        e.position,
        Position {
            x: 1.0,
            y: 1.0,
            w: 2.0,
            h: 1.0
        }
    );
    assert_eq!(e.style.font_size, Some(24.0));
    assert_eq!(e.style.bold, Some(true));
    assert_eq!(e.style.italic, Some(false));
    assert_eq!(slide.title.as_deref(), Some("Hello"));
}

#[test]
fn paragraphs_end_with_newline_then_trim() {
    let xml = r#"<p:sp><p:txBody>
        <a:p><a:r><a:t>Line </a:t></a:r><a:r><a:t>one</a:t></a:r></a:p>
        <a:p/>
        <a:p><a:r><a:t>two</a:t></a:r></a:p>
    </p:txBody></p:sp>"#;
    let root = parse_xml(xml).unwrap();
    assert_eq!(shape_text(&root), "Line one\n\ntwo");
    assert_eq!(shape_style(&root), ElementStyle::default());
}

#[test]
fn picture_resolves_through_slide_scope() {
    let png = [7u8; 42];
    let ctx = ctx_with(&[("ppt/media/image1.png", &png)], Some((3, RELS)));
    let slide = parse_slide(&ctx, 3, "ppt/slides/slide3.xml", &sld(PIC))
        .unwrap()
        .into_slide();
    let media = slide.content[0].content.as_media().unwrap();
    assert_eq!(media.url, "ppt/media/image1.png");
    assert_eq!(media.filename, "image1.png");
    assert_eq!(media.size, 42);
    assert_eq!(slide.content[0].kind, ElementKind::Image);
    assert_eq!(slide.title, None);
}

#[test]
fn picture_without_rels_degrades_to_empty_url() {
    let ctx = ctx_with(&[("ppt/media/image1.png", b"x")], Some((3, RELS)));
    // Slide 4 has no relationship scope.
    let slide = parse_slide(&ctx, 4, "ppt/slides/slide4.xml", &sld(PIC))
        .unwrap()
        .into_slide();
    let media = slide.content[0].content.as_media().unwrap();
    assert_eq!(media.url, "");
    assert_eq!(media.filename, "image.png");
    assert_eq!(media.size, 0);
}

#[test]
fn shapes_keep_document_order_and_kinds() {
    let tree = format!(
        r#"{PIC}<p:graphicFrame><p:xfrm><a:off x="0" y="914400"/><a:ext cx="914400" cy="914400"/></p:xfrm></p:graphicFrame>
<p:grpSp><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm></p:grpSpPr>{HELLO}<p:sp><p:txBody><a:p><a:r><a:t>World</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
<p:cxnSp/>{HELLO}"#
    );
    let ctx = ctx_with(&[("x", b"x")], None);
    let slide = parse_slide(&ctx, 1, "s", &sld(&tree)).unwrap().into_slide();
    let kinds: Vec<_> = slide.content.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Image,
            ElementKind::Chart,
            ElementKind::Shape,
            ElementKind::Text
        ]
    );
    assert_eq!(slide.content[1].position.y, 1.0);
    assert_eq!(slide.content[1].content.as_text(), Some(""));
    assert_eq!(slide.content[2].content.as_text(), Some("Hello\nWorld"));
    assert_eq!(slide.content[3].id, "slide-1-el-3");
}

#[test]
fn malformed_transform_uses_fallback_and_reports_degraded() {
    let tree = r#"<p:sp><p:spPr><a:xfrm><a:off x="abc" y="0"/><a:ext cx="1" cy="1"/></a:xfrm></p:spPr></p:sp>
<p:sp><p:txBody><a:p><a:r><a:t>no xfrm</a:t></a:r></a:p></p:txBody></p:sp>"#;
    let ctx = ctx_with(&[("x", b"x")], None);
    match parse_slide(&ctx, 2, "s", &sld(tree)).unwrap() {
        SlideOutcome::Degraded { slide, issues } => {
            assert_eq!(issues.len(), 1);
            assert!(issues[0].starts_with("slide-2-el-0"));
            assert_eq!(slide.content[0].position, Position::FALLBACK);
            assert_eq!(slide.content[1].position, Position::FALLBACK);
        }
        SlideOutcome::Parsed(_) => panic!("expected degraded outcome"),
    }
}

#[test]
fn broken_slide_xml_is_an_error() {
    let ctx = ctx_with(&[("x", b"x")], None);
    assert!(parse_slide(&ctx, 1, "s", "<p:sld><p:cSld>").is_err());
    assert!(parse_slide(&ctx, 1, "s", "<p:notes/>").is_err());
}

#[test]
fn title_heuristic_takes_first_line_of_short_text() {
    let mk = |text: &str| Element {
        id: "e".into(),
        kind: ElementKind::Text,
        content: ElementContent::Text(text.into()),
        position: Position::FALLBACK,
        style: ElementStyle::default(),
    };
    let long = "x".repeat(150);
    assert_eq!(
        slide_title(&[mk("  "), mk(&long), mk("Agenda\nItem one")]),
        Some("Agenda".to_owned())
    );
    assert_eq!(slide_title(&[mk(&long)]), None);
}

#[test]
fn fallback_slide_has_one_element() {
    let s = fallback_slide(7, "ppt/slides/slide7.xml");
    assert_eq!(s.title.as_deref(), Some("Slide 7"));
    assert_eq!(s.content.len(), 1);
    assert_eq!(
        s.content[0].position,
        Position {
            x: 1.0,
            y: 1.0,
            w: 8.0,
            h: 1.0
        }
    );
    assert_eq!(s.content[0].style.font_size, Some(24.0));
    assert!(s.metadata.degraded);
}

#[test]
fn plain_text_joins_shapes_with_spaces() {
    let text = slide_plain_text(&sld(&format!("{HELLO}{PIC}{HELLO}"))).unwrap();
    assert_eq!(text, "Hello Hello");
    assert_eq!(slide_plain_text("<p:sld/>").unwrap(), "");
}
