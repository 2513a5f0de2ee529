#![allow(dead_code)]

use std::io::{Cursor, Write};

pub const EMU: i64 = 914_400;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// `<p:sp>` with one text run, geometry in EMU.
pub fn text_shape(id: u32, text: &str, (x, y, cx, cy): (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="2400"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

/// `<p:pic>` embedding relationship `rid`.
pub fn picture(id: u32, rid: &str, (x, y, cx, cy): (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rid}"/></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr></p:pic>"#
    )
}

pub fn slide_xml(shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        shapes.concat()
    )
}

pub fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct SlideSpec {
    xml: String,
    /// `(rId, target relative to ppt/slides)`.
    rels: Vec<(String, String)>,
    write_rels: bool,
}

/// Writes minimal but conformant presentation archives.
pub struct DeckBuilder {
    title: Option<String>,
    creator: Option<String>,
    slides: Vec<SlideSpec>,
    extra: Vec<(String, Vec<u8>)>,
    with_theme: bool,
}

impl Default for DeckBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self {
            title: None,
            creator: None,
            slides: Vec::new(),
            extra: Vec::new(),
            with_theme: true,
        }
    }

    pub fn title(mut self, t: &str) -> Self {
        self.title = Some(t.to_owned());
        self
    }

    pub fn creator(mut self, c: &str) -> Self {
        self.creator = Some(c.to_owned());
        self
    }

    pub fn slide(mut self, shapes: &[String]) -> Self {
        self.slides.push(SlideSpec {
            xml: slide_xml(shapes),
            rels: Vec::new(),
            write_rels: true,
        });
        self
    }

    /// A slide whose part holds `xml` verbatim.
    pub fn raw_slide(mut self, xml: &str) -> Self {
        self.slides.push(SlideSpec {
            xml: xml.to_owned(),
            rels: Vec::new(),
            write_rels: true,
        });
        self
    }

    /// Relationship on the most recently added slide.
    pub fn rel(mut self, rid: &str, target: &str) -> Self {
        if let Some(s) = self.slides.last_mut() {
            s.rels.push((rid.to_owned(), target.to_owned()));
        }
        self
    }

    /// Drop the relationships part of the most recently added slide.
    pub fn without_rels(mut self) -> Self {
        if let Some(s) = self.slides.last_mut() {
            s.write_rels = false;
        }
        self
    }

    pub fn without_theme(mut self) -> Self {
        self.with_theme = false;
        self
    }

    pub fn entry(mut self, name: &str, bytes: &[u8]) -> Self {
        self.extra.push((name.to_owned(), bytes.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let opts = zip::write::SimpleFileOptions::default();
        let mut put = |name: &str, data: &[u8]| {
            w.start_file(name, opts).unwrap();
            w.write_all(data).unwrap();
        };

        put("[Content_Types].xml", br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/></Types>"#);
        put("_rels/.rels", br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#);

        let mut core = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/">"#,
        );
        if let Some(t) = &self.title {
            core.push_str(&format!("<dc:title>{t}</dc:title>"));
        }
        if let Some(c) = &self.creator {
            core.push_str(&format!("<dc:creator>{c}</dc:creator>"));
        }
        core.push_str("<dcterms:created>2024-01-02T03:04:05Z</dcterms:created></cp:coreProperties>");
        put("docProps/core.xml", core.as_bytes());
        put(
            "docProps/app.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Slides>{}</Slides><AppVersion>16.0000</AppVersion></Properties>"#,
                self.slides.len()
            )
            .as_bytes(),
        );

        let mut sld_ids = String::new();
        let mut pres_rels = String::new();
        for i in 1..=self.slides.len() {
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{i}"/>"#, 255 + i));
            pres_rels.push_str(&format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#
            ));
        }
        put(
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation {NS}><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
            )
            .as_bytes(),
        );
        put(
            "ppt/_rels/presentation.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{pres_rels}</Relationships>"#
            )
            .as_bytes(),
        );

        if self.with_theme {
            put("ppt/theme/theme1.xml", br##"<?xml version="1.0" encoding="UTF-8"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Test Theme"><a:themeElements><a:clrScheme name="Test"><a:dk1><a:srgbClr val="111111"/></a:dk1><a:lt1><a:srgbClr val="FAFAFA"/></a:lt1><a:dk2><a:srgbClr val="222222"/></a:dk2><a:lt2><a:srgbClr val="EEEEEE"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1></a:clrScheme><a:fontScheme name="Test"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"##);
        }

        for (i, s) in self.slides.iter().enumerate() {
            let n = i + 1;
            put(&format!("ppt/slides/slide{n}.xml"), s.xml.as_bytes());
            if s.write_rels {
                let rels: String = s
                    .rels
                    .iter()
                    .map(|(id, target)| {
                        format!(
                            r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="{target}"/>"#
                        )
                    })
                    .collect();
                put(
                    &format!("ppt/slides/_rels/slide{n}.xml.rels"),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
                    )
                    .as_bytes(),
                );
            }
        }

        for (name, bytes) in &self.extra {
            put(name, bytes);
        }
        drop(put);
        w.finish().unwrap().into_inner()
    }
}

/// Rewrite the uncompressed size recorded for `name` in both the local and central headers,
/// leaving the stored data untouched.
pub fn inflate_declared_size(mut bytes: Vec<u8>, name: &str, size: u32) -> Vec<u8> {
    let le16 = |b: &[u8], at: usize| usize::from(u16::from_le_bytes([b[at], b[at + 1]]));
    let mut patched = 0;
    let mut i = 0;
    while i + 4 <= bytes.len() {
        let (size_at, name_len_at, name_at) = match &bytes[i..i + 4] {
            [0x50, 0x4b, 0x03, 0x04] => (22, 26, 30),
            [0x50, 0x4b, 0x01, 0x02] => (24, 28, 46),
            _ => {
                i += 1;
                continue;
            }
        };
        let len = le16(&bytes, i + name_len_at);
        if bytes.get(i + name_at..i + name_at + len) == Some(name.as_bytes()) {
            bytes[i + size_at..i + size_at + 4].copy_from_slice(&size.to_le_bytes());
            patched += 1;
        }
        i += 4;
    }
    assert_eq!(patched, 2, "expected one local and one central header for {name}");
    bytes
}
