use super::*;

use std::io::{Cursor, Write};

use crate::deck::model::{
    DocumentMetadata, DocumentSettings, ElementContent, ElementStyle, MediaRef, Position,
    SlideLayout, SlideMetadata,
};
use crate::package::theme::Theme;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn archive_with(entries: &[(&str, &[u8])]) -> Archive {
    let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        w.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        w.write_all(data).unwrap();
    }
    Archive::open(w.finish().unwrap().into_inner()).unwrap()
}

fn document(slides: Vec<Slide>) -> Document {
    let now = chrono::Utc::now();
    Document {
        id: "doc".into(),
        filename: "deck.pptx".into(),
        title: "Deck".into(),
        author: "Unknown".into(),
        metadata: DocumentMetadata {
            created_at: now,
            updated_at: now,
            slide_count: slides.len(),
            file_size: 0,
            checksum: String::new(),
            language: "en-US".into(),
            subject: None,
            description: None,
            app_version: None,
        },
        slides,
        master_slides: Vec::new(),
        themes: Vec::new(),
        settings: DocumentSettings::default(),
    }
}

fn slide(n: u32, content: Vec<Element>) -> Slide {
    Slide {
        id: format!("slide-{n}"),
        slide_number: n,
        title: Some(format!("Title {n}")),
        content,
        layout: SlideLayout::default(),
        metadata: SlideMetadata::default(),
    }
}

fn hello() -> Element {
    Element {
        id: "slide-1-el-0".into(),
        kind: ElementKind::Text,
        content: ElementContent::Text("Hello".into()),
        position: Position {
            x: 1.0,
            y: 1.0,
            w: 2.0,
            h: 1.0,
        },
        style: ElementStyle {
            font_size: Some(36.0),
            bold: Some(true),
            italic: None,
        },
    }
}

fn picture(url: &str) -> Element {
    Element {
        id: "slide-1-el-1".into(),
        kind: ElementKind::Image,
        content: ElementContent::Media(MediaRef {
            id: "slide-1-el-1-media".into(),
            kind: "image".into(),
            url: url.into(),
            filename: "image1.png".into(),
            size: 0,
        }),
        position: Position::FALLBACK,
        style: ElementStyle::default(),
    }
}

#[test]
fn inches_scale_to_canvas_pixels() {
    let doc = document(vec![slide(1, vec![hello()])]);
    let canvas = Canvas::new(1000, 750).unwrap();
    let scenes = scenes_from_document(&doc, None, canvas, &TimelineOptions::default());
    assert_eq!(scenes.len(), 1);

    let s = &scenes[0];
    assert_eq!(s.id, "scene-1");
    assert_eq!(s.title, "Title 1");
    assert_eq!(s.content, "Hello");
    assert_eq!(s.duration, 5.0);
    assert_eq!(s.background, "#FFFFFF");

    let el = &s.elements[0];
    assert_eq!(el.kind, SceneElementKind::Text);
    assert_eq!((el.x, el.y, el.width, el.height), (100.0, 100.0, 200.0, 100.0));
    assert_eq!(el.style.font_size, 50.0);
    assert!(el.style.bold);
    assert_eq!(el.style.color, "#000000");
}

#[test]
fn theme_colors_drive_background_and_text() {
    let mut doc = document(vec![slide(1, vec![hello()])]);
    let mut theme = Theme::default();
    theme.color_scheme.background1 = "#102030".into();
    theme.color_scheme.text1 = "#F0F0F0".into();
    doc.themes.push(theme);

    let scenes = scenes_from_document(
        &doc,
        None,
        Canvas::new(640, 480).unwrap(),
        &TimelineOptions::default(),
    );
    assert_eq!(scenes[0].background, "#102030");
    assert_eq!(scenes[0].elements[0].style.color, "#F0F0F0");
}

#[test]
fn pictures_become_data_uris_when_archive_is_given() {
    let png = png_bytes();
    let archive = archive_with(&[("ppt/media/image1.png", &png)]);
    let doc = document(vec![slide(
        1,
        vec![picture("ppt/media/image1.png"), picture("")],
    )]);
    let canvas = Canvas::new(640, 480).unwrap();

    let with = scenes_from_document(&doc, Some(&archive), canvas, &TimelineOptions::default());
    let src = with[0].elements[0].src.as_deref().unwrap();
    assert!(src.starts_with("data:image/png;base64,"));
    assert_eq!(with[0].elements[1].src, None);

    let without = scenes_from_document(&doc, None, canvas, &TimelineOptions::default());
    assert_eq!(without[0].elements[0].src, None);
}

#[test]
fn undrawable_media_yields_no_uri() {
    let archive = archive_with(&[("ppt/media/clip.mp3", b"ID3 not an image")]);
    assert_eq!(data_uri_for(&archive, "ppt/media/clip.mp3"), None);
    assert_eq!(data_uri_for(&archive, "ppt/media/missing.png"), None);
}
