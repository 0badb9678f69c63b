use mapsheet_layout::mm_to_pt;

/// Raster pixels ready for embedding as a PDF image XObject.
#[derive(Debug, Clone)]
pub enum RasterImage {
    /// JPEG-encoded pixels, embedded verbatim with `DCTDecode`.
    Jpeg {
        width_px: u32,
        height_px: u32,
        data: Vec<u8>,
    },
    /// Raw 8-bit RGB pixels (decoded PNG), embedded unfiltered.
    Rgb8 {
        width_px: u32,
        height_px: u32,
        data: Vec<u8>,
    },
}

impl RasterImage {
    pub fn width_px(&self) -> u32 {
        match self {
            RasterImage::Jpeg { width_px, .. } | RasterImage::Rgb8 { width_px, .. } => *width_px,
        }
    }

    pub fn height_px(&self) -> u32 {
        match self {
            RasterImage::Jpeg { height_px, .. } | RasterImage::Rgb8 { height_px, .. } => *height_px,
        }
    }
}

/// Millimetre-space placement of a drawn element, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectMm {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Drawing commands the compositor emits for the assembler.
/// 合成器送交組版器的繪圖指令。
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// Decorative raster at its element position.
    Image { rect: RectMm, image: RasterImage },
    /// Map snapshot: raster plus a stroked border rectangle.
    FramedImage { rect: RectMm, image: RasterImage },
    /// Text run; `y_mm` is the baseline position.
    Text {
        x_mm: f64,
        y_mm: f64,
        size_pt: f64,
        text: String,
    },
}

/// One composed page: layout dimensions plus its accumulated ops.
#[derive(Debug, Clone)]
pub struct PageComposer {
    width_mm: f64,
    height_mm: f64,
    ops: Vec<DrawOp>,
}

impl PageComposer {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }
}

/// Multi-page PDF document assembler.
///
/// Page size comes from the layout's millimetre dimensions, so a
/// layout wider than tall yields a landscape page.
#[derive(Debug, Default)]
pub struct PdfDocument {
    pages: Vec<PageComposer>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, page: PageComposer) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes the document. Finalization is single-shot: the
    /// assembler is consumed.
    pub fn finish(self) -> Vec<u8> {
        let mut builder = PdfBuilder::new();
        let font_object =
            builder.add_object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());

        struct PreparedPage {
            content_object: usize,
            images: Vec<usize>,
        }

        let mut prepared = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let mut images = Vec::new();
            for op in page.ops() {
                if let DrawOp::Image { image, .. } | DrawOp::FramedImage { image, .. } = op {
                    images.push(builder.add_image(image));
                }
            }
            let content = render_content_stream(page);
            let content_object = builder.add_stream("", &content);
            prepared.push(PreparedPage {
                content_object,
                images,
            });
        }

        // Page objects follow the streams; the pages tree comes right
        // after them, so its number is known up front.
        let first_page_object = builder.next_number();
        let pages_object = first_page_object + prepared.len();

        for (page, info) in self.pages.iter().zip(&prepared) {
            let width_pt = fmt_float(mm_to_pt(page.width_mm()));
            let height_pt = fmt_float(mm_to_pt(page.height_mm()));
            let xobjects = info
                .images
                .iter()
                .enumerate()
                .map(|(index, object)| format!("/Im{index} {object} 0 R"))
                .collect::<Vec<_>>()
                .join(" ");
            let page_body = format!(
                "<< /Type /Page /Parent {pages_object} 0 R \
                 /MediaBox [0 0 {width_pt} {height_pt}] \
                 /Resources << /Font << /F1 {font_object} 0 R >> \
                 /XObject << {xobjects} >> >> \
                 /Contents {content} 0 R >>",
                content = info.content_object,
            );
            builder.add_object(page_body.into_bytes());
        }

        let kids = (first_page_object..pages_object)
            .map(|object| format!("{object} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        builder.add_object(
            format!(
                "<< /Type /Pages /Count {} /Kids [{kids}] >>",
                prepared.len()
            )
            .into_bytes(),
        );
        let catalog = builder.add_object(
            format!("<< /Type /Catalog /Pages {pages_object} 0 R >>").into_bytes(),
        );

        builder.finish(catalog)
    }
}

fn render_content_stream(page: &PageComposer) -> Vec<u8> {
    let page_height_pt = mm_to_pt(page.height_mm());
    let mut stream = String::new();
    let mut image_index = 0usize;

    for op in page.ops() {
        match op {
            DrawOp::Image { rect, .. } => {
                push_image_placement(&mut stream, rect, page_height_pt, image_index);
                image_index += 1;
            }
            DrawOp::FramedImage { rect, .. } => {
                push_image_placement(&mut stream, rect, page_height_pt, image_index);
                image_index += 1;
                let x = fmt_float(mm_to_pt(rect.x_mm));
                let y = fmt_float(page_height_pt - mm_to_pt(rect.y_mm + rect.height_mm));
                let w = fmt_float(mm_to_pt(rect.width_mm));
                let h = fmt_float(mm_to_pt(rect.height_mm));
                stream.push_str(&format!("0 0 0 RG\n0.7 w\n{x} {y} {w} {h} re S\n"));
            }
            DrawOp::Text {
                x_mm,
                y_mm,
                size_pt,
                text,
            } => {
                let x = fmt_float(mm_to_pt(*x_mm));
                let y = fmt_float(page_height_pt - mm_to_pt(*y_mm));
                let size = fmt_float(*size_pt);
                let escaped = pdf_escape_text(text);
                stream.push_str(&format!(
                    "0 0 0 rg\nBT\n/F1 {size} Tf\n1 0 0 1 {x} {y} Tm\n({escaped}) Tj\nET\n"
                ));
            }
        }
    }

    stream.into_bytes()
}

fn push_image_placement(stream: &mut String, rect: &RectMm, page_height_pt: f64, index: usize) {
    let x = fmt_float(mm_to_pt(rect.x_mm));
    let y = fmt_float(page_height_pt - mm_to_pt(rect.y_mm + rect.height_mm));
    let w = fmt_float(mm_to_pt(rect.width_mm));
    let h = fmt_float(mm_to_pt(rect.height_mm));
    stream.push_str(&format!("q\n{w} 0 0 {h} {x} {y} cm\n/Im{index} Do\nQ\n"));
}

fn fmt_float(value: f64) -> String {
    format!("{:.3}", value)
}

fn pdf_escape_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '(' | ')' | '\\' => {
                output.push('\\');
                output.push(ch);
            }
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            _ => output.push(ch),
        }
    }
    output
}

struct PdfObject {
    number: usize,
    body: Vec<u8>,
}

/// Low-level object/xref writer. Bodies are bytes, not text: image
/// streams must pass through unmangled.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    fn next_number(&self) -> usize {
        self.objects.len() + 1
    }

    fn add_object(&mut self, body: Vec<u8>) -> usize {
        let number = self.next_number();
        self.objects.push(PdfObject { number, body });
        number
    }

    fn add_stream(&mut self, dict_entries: &str, stream: &[u8]) -> usize {
        let mut body =
            format!("<< {dict_entries} /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(stream);
        body.extend_from_slice(b"\nendstream");
        self.add_object(body)
    }

    fn add_image(&mut self, image: &RasterImage) -> usize {
        match image {
            RasterImage::Jpeg {
                width_px,
                height_px,
                data,
            } => self.add_stream(
                &format!(
                    "/Type /XObject /Subtype /Image /Width {width_px} /Height {height_px} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode"
                ),
                data,
            ),
            RasterImage::Rgb8 {
                width_px,
                height_px,
                data,
            } => self.add_stream(
                &format!(
                    "/Type /XObject /Subtype /Image /Width {width_px} /Height {height_px} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8"
                ),
                data,
            ),
        }
    }

    fn finish(self, root: usize) -> Vec<u8> {
        let mut output = Vec::new();
        output.extend_from_slice(b"%PDF-1.4\n%\xFF\xFF\xFF\xFF\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            offsets.push(output.len());
            output.extend_from_slice(format!("{} 0 obj\n", object.number).as_bytes());
            output.extend_from_slice(&object.body);
            output.extend_from_slice(b"\nendobj\n");
        }

        let xref_start = output.len();
        output.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", self.objects.len() + 1).as_bytes(),
        );
        for offset in &offsets {
            output.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        output.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {root} 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
                self.objects.len() + 1
            )
            .as_bytes(),
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_text(data: &[u8]) -> String {
        String::from_utf8_lossy(data).into_owned()
    }

    fn jpeg_image() -> RasterImage {
        RasterImage::Jpeg {
            width_px: 4,
            height_px: 4,
            data: vec![0xFF, 0xD8, 0xFF, 0xD9],
        }
    }

    #[test]
    fn empty_page_produces_valid_skeleton() {
        let mut doc = PdfDocument::new();
        doc.add_page(PageComposer::new(210.0, 297.0));
        let data = doc.finish();

        assert!(data.starts_with(b"%PDF"));
        let text = pdf_text(&data);
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Type /Pages /Count 1"));
        assert!(text.contains("/Type /Page "));
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn media_box_converts_millimetres_to_points() {
        let mut doc = PdfDocument::new();
        doc.add_page(PageComposer::new(420.0, 297.0));
        let text = pdf_text(&doc.finish());

        let expected = format!(
            "/MediaBox [0 0 {} {}]",
            fmt_float(mm_to_pt(420.0)),
            fmt_float(mm_to_pt(297.0))
        );
        assert!(text.contains(&expected), "missing {expected}");
    }

    #[test]
    fn framed_image_embeds_dctdecode_xobject_and_border() {
        let mut page = PageComposer::new(210.0, 297.0);
        page.push(DrawOp::FramedImage {
            rect: RectMm {
                x_mm: 20.0,
                y_mm: 40.0,
                width_mm: 171.0,
                height_mm: 167.0,
            },
            image: jpeg_image(),
        });
        let mut doc = PdfDocument::new();
        doc.add_page(page);
        let text = pdf_text(&doc.finish());

        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Im0 Do"));
        assert!(text.contains("re S"));
        assert!(text.contains("/Im0 2 0 R"));
    }

    #[test]
    fn text_runs_are_escaped() {
        let mut page = PageComposer::new(210.0, 297.0);
        page.push(DrawOp::Text {
            x_mm: 20.0,
            y_mm: 45.6,
            size_pt: 18.0,
            text: "Harbour (east) \\ overview".to_string(),
        });
        let mut doc = PdfDocument::new();
        doc.add_page(page);
        let text = pdf_text(&doc.finish());

        assert!(text.contains("(Harbour \\(east\\) \\\\ overview) Tj"));
        assert!(text.contains("/F1 18.000 Tf"));
    }

    #[test]
    fn multiple_pages_share_one_kids_array() {
        let mut doc = PdfDocument::new();
        doc.add_page(PageComposer::new(210.0, 297.0));
        doc.add_page(PageComposer::new(420.0, 297.0));
        let text = pdf_text(&doc.finish());

        assert!(text.contains("/Type /Pages /Count 2"));
        let kids_line = text
            .lines()
            .find(|line| line.contains("/Kids"))
            .expect("kids entry");
        assert_eq!(kids_line.matches(" 0 R").count(), 2);
    }

    #[test]
    fn binary_image_bytes_survive_untouched() {
        let payload = vec![0x00, 0xFF, 0x10, 0xD8, 0x80, 0x7F];
        let mut page = PageComposer::new(100.0, 100.0);
        page.push(DrawOp::Image {
            rect: RectMm {
                x_mm: 0.0,
                y_mm: 0.0,
                width_mm: 10.0,
                height_mm: 10.0,
            },
            image: RasterImage::Rgb8 {
                width_px: 1,
                height_px: 2,
                data: payload.clone(),
            },
        });
        let mut doc = PdfDocument::new();
        doc.add_page(page);
        let data = doc.finish();

        assert!(data
            .windows(payload.len())
            .any(|window| window == payload.as_slice()));
    }
}
