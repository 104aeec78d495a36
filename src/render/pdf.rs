//! 绘制指令 → PDF 字节 (lopdf)

use super::layout::{DrawOp, Font, Page, Rgb};
use crate::error::RenderError;
use crate::models::PageSize;
use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const PRODUCER: &str = "dc-audit-report";

fn font_name(font: Font) -> &'static str {
    match font {
        Font::Regular => "F1",
        Font::Bold => "F2",
    }
}

/// 标准字体只支持 WinAnsi, 无法映射的字符输出为 `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    vec![color.0.into(), color.1.into(), color.2.into()]
}

fn rect_operands(x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![x.into(), y.into(), width.into(), height.into()]
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut operations = Vec::with_capacity(page.ops.len() * 4);

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![font_name(*font).into(), (*size).into()],
                ));
                operations.push(Operation::new("rg", rgb_operands(*color)));
                operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                operations.push(Operation::new("rg", rgb_operands(*color)));
                operations.push(Operation::new("re", rect_operands(*x, *y, *width, *height)));
                operations.push(Operation::new("f", vec![]));
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color,
            } => {
                operations.push(Operation::new("w", vec![(*line_width).into()]));
                operations.push(Operation::new("RG", rgb_operands(*color)));
                operations.push(Operation::new("re", rect_operands(*x, *y, *width, *height)));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }

    operations
}

/// 生成 PDF; 相同输入得到相同字节
pub fn encode(
    pages: &[Page],
    page_size: PageSize,
    title: &str,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, RenderError> {
    let (width, height) = page_size.dimensions();
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            font_name(Font::Regular) => regular_id,
            font_name(Font::Bold) => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let media_box: Vec<Object> = vec![0i64.into(), 0i64.into(), width.into(), height.into()];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(format!("D:{}", generated_at.format("%Y%m%d%H%M%S"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    tracing::debug!("Encoded PDF: {} pages, {} bytes", pages.len(), buffer.len());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 7)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn page(number: usize, text: &str) -> Page {
        Page {
            number,
            ops: vec![
                DrawOp::FillRect {
                    x: 36.0,
                    y: 700.0,
                    width: 100.0,
                    height: 20.0,
                    color: Rgb::ACCENT,
                },
                DrawOp::Text {
                    x: 40.0,
                    y: 705.0,
                    font: Font::Bold,
                    size: 9.0,
                    color: Rgb::WHITESMOKE,
                    text: text.to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Acme (1g)"), b"Acme (1g)".to_vec());
        assert_eq!(encode_win_ansi("Café – 1g"), vec![b'C', b'a', b'f', 0xe9, b' ', 0x96, b' ', b'1', b'g']);
        assert_eq!(encode_win_ansi("大麻"), b"??".to_vec());
    }

    #[test]
    fn test_encoded_pdf_round_trips_through_lopdf() {
        let pages = vec![page(1, "Product (1/2)"), page(2, "Batch #")];
        let bytes = encode(&pages, PageSize::A4, "Audit", timestamp()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        assert_eq!(page_ids.len(), 2);

        let content = doc.get_page_content(page_ids[0]).unwrap();
        let operations = Content::decode(&content).unwrap().operations;
        let strings: Vec<Vec<u8>> = operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(strings, vec![b"Product (1/2)".to_vec()]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let pages = vec![page(1, "Product")];
        let first = encode(&pages, PageSize::Letter, "Audit", timestamp()).unwrap();
        let second = encode(&pages, PageSize::Letter, "Audit", timestamp()).unwrap();
        assert_eq!(first, second);
    }
}
