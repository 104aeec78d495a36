//! 文档排版: 先组装内容流 (story), 再分页成绘制指令
//!
//! 内容流与分页分开, 这样结构 (分节、分页符、签名栏) 可以脱离 PDF 单独验证。

use super::metrics::{text_width, wrap_text};
use crate::models::{group_by_category, unique_batches, AuditLine, PageSize, Selection};
use chrono::NaiveDateTime;

/// 缺失分类的分节标题
pub const UNCATEGORIZED: &str = "Uncategorized";

const ELLIPSIS: &str = "...";

// 页边距 (pt)
pub const MARGIN_TOP: f32 = 36.0;
pub const MARGIN_BOTTOM: f32 = 54.0;
pub const MARGIN_SIDE: f32 = 36.0;

const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 10.0;
const SECTION_SIZE: f32 = 14.0;
const HEADER_SIZE: f32 = 9.0;
const CELL_SIZE: f32 = 8.0;
const CELL_LEADING: f32 = 10.0;
const CELL_PAD_X: f32 = 4.0;
const HEADER_PAD_Y: f32 = 8.0;
const ROW_PAD_Y: f32 = 6.0;
const SIGNATURE_SIZE: f32 = 10.0;
const SIGNATURE_ROW_HEIGHT: f32 = 24.0;
const FOOTER_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GREY: Rgb = Rgb(0.5, 0.5, 0.5);
    /// #1f77b4
    pub const ACCENT: Rgb = Rgb(0.122, 0.467, 0.706);
    pub const WHITESMOKE: Rgb = Rgb(0.961, 0.961, 0.961);
    /// #f0f0f0
    pub const ROW_ALT: Rgb = Rgb(0.941, 0.941, 0.941);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub title: &'static str,
    pub width: f32,
    pub align: Align,
}

/// 审计表四列: 商品、批次、系统数量、实盘数量 (留空)
pub const AUDIT_COLUMNS: [Column; 4] = [
    Column { title: "Product", width: 288.0, align: Align::Left },
    Column { title: "Batch #", width: 108.0, align: Align::Left },
    Column { title: "System\nQty", width: 50.4, align: Align::Center },
    Column { title: "Physical\nCount", width: 64.8, align: Align::Center },
];

/// 签名栏: 标签、签名线、日期标签、日期线
const SIGNATURE_WIDTHS: [f32; 4] = [72.0, 216.0, 50.4, 129.6];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub rows: Vec<[String; 4]>,
}

/// 内容流中的块
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Metadata(Vec<MetadataField>),
    Spacer(f32),
    SectionHeader { category: String, items: usize },
    Table(TableBlock),
    PageBreak,
    Signature,
}

/// 组装内容流所需的上下文
#[derive(Debug, Clone)]
pub struct StoryContext<'a> {
    pub title: &'a str,
    pub categories: &'a Selection,
    pub brands: &'a Selection,
    pub generated_at: NaiveDateTime,
    pub product_max_chars: usize,
}

fn field(label: &str, value: impl Into<String>) -> MetadataField {
    MetadataField {
        label: label.to_string(),
        value: value.into(),
    }
}

/// 超长商品名截断并加省略号
pub fn truncate_product(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name
        .chars()
        .take(max_chars.saturating_sub(ELLIPSIS.len()))
        .collect();
    format!("{}{}", kept, ELLIPSIS)
}

fn table_row(line: &AuditLine, product_max_chars: usize) -> [String; 4] {
    [
        truncate_product(line.product_name.as_deref().unwrap_or_default(), product_max_chars),
        line.batch_number.clone().unwrap_or_default(),
        line.system_qty.to_string(),
        String::new(),
    ]
}

/// 组装内容流: 标题、抬头信息、按分类分节的表格、签名栏
pub fn compose(lines: &[AuditLine], ctx: &StoryContext<'_>) -> Vec<Block> {
    let mut story = vec![
        Block::Title(ctx.title.to_string()),
        Block::Spacer(7.2),
        Block::Metadata(vec![
            field("Date", ctx.generated_at.format("%B %d, %Y").to_string()),
            field("Time", ctx.generated_at.format("%I:%M %p").to_string()),
            field("Unique Batches", unique_batches(lines).to_string()),
        ]),
        Block::Metadata(vec![
            field("Categories", ctx.categories.describe("All Categories")),
            field("Brands", ctx.brands.describe("All Brands")),
        ]),
        Block::Spacer(10.8),
    ];

    let sections = group_by_category(lines);
    let section_count = sections.len();
    for (idx, (category, items)) in sections.into_iter().enumerate() {
        story.push(Block::SectionHeader {
            category: category.unwrap_or(UNCATEGORIZED).to_string(),
            items: items.len(),
        });
        story.push(Block::Spacer(7.2));
        story.push(Block::Table(TableBlock {
            rows: items
                .into_iter()
                .map(|line| table_row(line, ctx.product_max_chars))
                .collect(),
        }));
        story.push(Block::Spacer(14.4));

        if idx + 1 < section_count {
            story.push(Block::PageBreak);
        }
    }

    story.push(Block::Spacer(21.6));
    story.push(Block::Signature);
    story
}

/// 绘制指令, 坐标为 PDF 坐标 (左下角原点, pt)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// 页面上的全部文本 (测试与调试用)
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// 单元格折行后的文本行
fn cell_lines(text: &str, column: &Column, font: Font, size: f32) -> Vec<String> {
    text.split('\n')
        .flat_map(|part| wrap_text(part, column.width - 2.0 * CELL_PAD_X, font, size))
        .collect()
}

/// 单元格超过一页时截断, 最后一行以省略号结尾
fn clamp_lines(mut lines: Vec<String>, max_lines: usize, column: &Column) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    tracing::warn!(
        "Cell in column {:?} needs {} lines, truncated to {}",
        column.title,
        lines.len(),
        max_lines
    );
    lines.truncate(max_lines);

    let max_width = column.width - 2.0 * CELL_PAD_X;
    if let Some(last) = lines.last_mut() {
        while !last.is_empty()
            && text_width(&format!("{}{}", last, ELLIPSIS), Font::Regular, CELL_SIZE) > max_width
        {
            last.pop();
        }
        last.push_str(ELLIPSIS);
    }
    lines
}

struct Paginator {
    width: f32,
    height: f32,
    cursor: f32,
    ops: Vec<DrawOp>,
    pages: Vec<Page>,
}

impl Paginator {
    fn new(page_size: PageSize) -> Self {
        let (width, height) = page_size.dimensions();
        Self {
            width,
            height,
            cursor: height - MARGIN_TOP,
            ops: Vec::new(),
            pages: Vec::new(),
        }
    }

    fn remaining(&self) -> f32 {
        self.cursor - MARGIN_BOTTOM
    }

    fn is_fresh(&self) -> bool {
        self.ops.is_empty()
    }

    fn finish_page(&mut self) {
        let number = self.pages.len() + 1;
        let footer = format!("Page {}", number);
        let x = (self.width - text_width(&footer, Font::Regular, FOOTER_SIZE)) / 2.0;
        self.text(x, MARGIN_BOTTOM / 2.0, Font::Regular, FOOTER_SIZE, Rgb::GREY, footer);

        self.pages.push(Page {
            number,
            ops: std::mem::take(&mut self.ops),
        });
        self.cursor = self.height - MARGIN_TOP;
    }

    /// 剩余空间不足时换页 (空白页不再换)
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.is_fresh() {
            self.finish_page();
        }
    }

    fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text: text.into(),
        });
    }

    fn spacer(&mut self, height: f32) {
        if self.is_fresh() {
            return;
        }
        if height > self.remaining() {
            self.finish_page();
        } else {
            self.cursor -= height;
        }
    }

    fn right_edge(&self) -> f32 {
        self.width - MARGIN_SIDE
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * MARGIN_SIDE
    }

    fn title(&mut self, title: &str) {
        let leading = TITLE_SIZE * 1.2;
        let lines = wrap_text(title, self.content_width(), Font::Bold, TITLE_SIZE);
        self.ensure(lines.len() as f32 * leading + 6.0);
        for line in lines {
            let x = (self.width - text_width(&line, Font::Bold, TITLE_SIZE)) / 2.0;
            let y = self.cursor - TITLE_SIZE;
            self.text(x, y, Font::Bold, TITLE_SIZE, Rgb::ACCENT, line);
            self.cursor -= leading;
        }
        self.cursor -= 6.0;
    }

    /// 字段依次排在同一行, 放不下时另起一行, 过长的值在右边距内折行
    fn metadata(&mut self, fields: &[MetadataField]) {
        let leading = META_SIZE * 1.2;
        let right = self.right_edge();

        // (行号, x, 字体, 文本)
        let mut placed: Vec<(usize, f32, Font, String)> = Vec::new();
        let mut row = 0usize;
        let mut x = MARGIN_SIDE;
        for field in fields {
            let label = format!("{}: ", field.label);
            let label_width = text_width(&label, Font::Bold, META_SIZE);
            let value_width = text_width(&field.value, Font::Regular, META_SIZE);
            if x > MARGIN_SIDE && x + label_width + value_width > right {
                row += 1;
                x = MARGIN_SIDE;
            }

            let value_x = x + label_width;
            let values = wrap_text(&field.value, right - value_x, Font::Regular, META_SIZE);
            let last_width = values
                .last()
                .map_or(0.0, |v| text_width(v, Font::Regular, META_SIZE));

            placed.push((row, x, Font::Bold, label));
            let value_rows = values.len();
            for (i, value) in values.into_iter().enumerate() {
                placed.push((row + i, value_x, Font::Regular, value));
            }
            row += value_rows.saturating_sub(1);
            x = value_x + last_width + 3.0 * META_SIZE;
        }

        let height = (row + 1) as f32 * leading + 8.0;
        self.ensure(height);
        let top = self.cursor;
        for (row, x, font, text) in placed {
            if text.is_empty() {
                continue;
            }
            let y = top - META_SIZE - row as f32 * leading;
            self.text(x, y, font, META_SIZE, Rgb::BLACK, text);
        }
        self.cursor -= height;
    }

    fn section_header(&mut self, category: &str, items: usize) {
        let leading = SECTION_SIZE * 1.2;
        let label = format!("Category: {}", category);
        let count = format!(" ({} items)", items);

        let mut lines = wrap_text(&label, self.content_width(), Font::Bold, SECTION_SIZE);
        let last_width = lines
            .last()
            .map_or(0.0, |l| text_width(l, Font::Bold, SECTION_SIZE));
        let count_width = text_width(&count, Font::Regular, SECTION_SIZE);
        let count_on_new_line = MARGIN_SIDE + last_width + count_width > self.right_edge();
        let rows = lines.len() + usize::from(count_on_new_line);

        let height = SECTION_SIZE * 1.3 + (rows - 1) as f32 * leading;
        // 标题不与表头分开
        let min_table = header_height() + CELL_LEADING + 2.0 * ROW_PAD_Y;
        self.ensure(height + min_table);

        let top = self.cursor;
        let last_row = lines.len() - 1;
        for (i, line) in lines.drain(..).enumerate() {
            let y = top - SECTION_SIZE - i as f32 * leading;
            self.text(MARGIN_SIDE, y, Font::Bold, SECTION_SIZE, Rgb::BLACK, line);
        }

        let (count_x, count_row, count) = if count_on_new_line {
            (MARGIN_SIDE, last_row + 1, count.trim_start().to_string())
        } else {
            (MARGIN_SIDE + last_width, last_row, count)
        };
        let y = top - SECTION_SIZE - count_row as f32 * leading;
        self.text(count_x, y, Font::Regular, SECTION_SIZE, Rgb::BLACK, count);
        self.cursor -= height;
    }

    fn table_header(&mut self) {
        let height = header_height();
        let table_width: f32 = AUDIT_COLUMNS.iter().map(|c| c.width).sum();
        let top = self.cursor;
        self.ops.push(DrawOp::FillRect {
            x: MARGIN_SIDE,
            y: top - height,
            width: table_width,
            height,
            color: Rgb::ACCENT,
        });

        let mut x = MARGIN_SIDE;
        for column in &AUDIT_COLUMNS {
            self.grid_cell(x, top, column.width, height);
            for (i, line) in column.title.split('\n').enumerate() {
                let line_width = text_width(line, Font::Bold, HEADER_SIZE);
                let y = top - HEADER_PAD_Y - HEADER_SIZE - i as f32 * CELL_LEADING;
                self.text(
                    x + (column.width - line_width) / 2.0,
                    y,
                    Font::Bold,
                    HEADER_SIZE,
                    Rgb::WHITESMOKE,
                    line,
                );
            }
            x += column.width;
        }
        self.cursor -= height;
    }

    fn grid_cell(&mut self, x: f32, top: f32, width: f32, height: f32) {
        self.ops.push(DrawOp::StrokeRect {
            x,
            y: top - height,
            width,
            height,
            line_width: 0.5,
            color: Rgb::GREY,
        });
    }

    /// 一行在空白页上 (表头之下) 最多容纳的文本行数
    fn max_row_lines(&self) -> usize {
        let body = self.height - MARGIN_TOP - MARGIN_BOTTOM - header_height() - 2.0 * ROW_PAD_Y;
        ((body / CELL_LEADING).floor() as usize).max(1)
    }

    /// 表格可跨页, 每页重复表头
    fn table(&mut self, table: &TableBlock) {
        let mut header_drawn = false;
        let max_lines = self.max_row_lines();

        for (row_idx, row) in table.rows.iter().enumerate() {
            let cells: Vec<Vec<String>> = row
                .iter()
                .zip(AUDIT_COLUMNS.iter())
                .map(|(text, column)| {
                    let lines = cell_lines(text, column, Font::Regular, CELL_SIZE);
                    clamp_lines(lines, max_lines, column)
                })
                .collect();
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(1);
            let height = line_count as f32 * CELL_LEADING + 2.0 * ROW_PAD_Y;

            if !header_drawn {
                self.ensure(header_height() + height);
                self.table_header();
                header_drawn = true;
            } else if height > self.remaining() {
                self.finish_page();
                self.table_header();
            }

            self.table_row(row_idx, &cells, height);
        }
    }

    fn table_row(&mut self, row_idx: usize, cells: &[Vec<String>], height: f32) {
        let top = self.cursor;
        let table_width: f32 = AUDIT_COLUMNS.iter().map(|c| c.width).sum();
        let background = if row_idx % 2 == 0 { Rgb::WHITE } else { Rgb::ROW_ALT };
        self.ops.push(DrawOp::FillRect {
            x: MARGIN_SIDE,
            y: top - height,
            width: table_width,
            height,
            color: background,
        });

        let mut x = MARGIN_SIDE;
        for (lines, column) in cells.iter().zip(AUDIT_COLUMNS.iter()) {
            self.grid_cell(x, top, column.width, height);
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let line_x = match column.align {
                    Align::Left => x + CELL_PAD_X,
                    Align::Center => {
                        x + (column.width - text_width(line, Font::Regular, CELL_SIZE)) / 2.0
                    }
                };
                let y = top - ROW_PAD_Y - CELL_SIZE - i as f32 * CELL_LEADING;
                self.text(line_x, y, Font::Regular, CELL_SIZE, Rgb::BLACK, line.clone());
            }
            x += column.width;
        }
        self.cursor -= height;
    }

    /// 签名栏整体保持在同一页
    fn signature(&mut self) {
        let rows = signature_rows();
        self.ensure(rows.len() as f32 * SIGNATURE_ROW_HEIGHT);
        for row in rows {
            let y = self.cursor - (SIGNATURE_ROW_HEIGHT + SIGNATURE_SIZE) / 2.0;
            let mut x = MARGIN_SIDE;
            for (text, width) in row.iter().zip(SIGNATURE_WIDTHS) {
                if !text.is_empty() {
                    self.text(x, y, Font::Regular, SIGNATURE_SIZE, Rgb::BLACK, text.clone());
                }
                x += width;
            }
            self.cursor -= SIGNATURE_ROW_HEIGHT;
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.is_fresh() || self.pages.is_empty() {
            self.finish_page();
        }
        self.pages
    }
}

fn header_height() -> f32 {
    let lines = AUDIT_COLUMNS
        .iter()
        .map(|c| c.title.split('\n').count())
        .max()
        .unwrap_or(1);
    lines as f32 * CELL_LEADING + 2.0 * HEADER_PAD_Y
}

/// 签名栏三行: 审核人、空行、复核人; 签名与日期处留出横线
pub fn signature_rows() -> [[String; 4]; 3] {
    let line = |n: usize| "_".repeat(n);
    [
        [
            "Audited By:".to_string(),
            line(40),
            "Date:".to_string(),
            line(20),
        ],
        Default::default(),
        [
            "Verified By:".to_string(),
            line(40),
            "Date:".to_string(),
            line(20),
        ],
    ]
}

/// 把内容流排到页面上
pub fn paginate(story: &[Block], page_size: PageSize) -> Vec<Page> {
    let mut paginator = Paginator::new(page_size);

    for block in story {
        match block {
            Block::Title(title) => paginator.title(title),
            Block::Metadata(fields) => paginator.metadata(fields),
            Block::Spacer(height) => paginator.spacer(*height),
            Block::SectionHeader { category, items } => paginator.section_header(category, *items),
            Block::Table(table) => paginator.table(table),
            Block::PageBreak => {
                if !paginator.is_fresh() {
                    paginator.finish_page();
                }
            }
            Block::Signature => paginator.signature(),
        }
    }

    paginator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn line(category: Option<&str>, product: &str, batch: &str, qty: i64) -> AuditLine {
        AuditLine {
            category: category.map(str::to_string),
            brand: "Acme".to_string(),
            product_name: Some(product.to_string()),
            batch_number: Some(batch.to_string()),
            system_qty: qty,
        }
    }

    fn ctx<'a>(categories: &'a Selection, brands: &'a Selection) -> StoryContext<'a> {
        StoryContext {
            title: "HAVEN DISTRIBUTION INVENTORY AUDIT WORKSHEET",
            categories,
            brands,
            generated_at: NaiveDate::from_ymd_opt(2025, 11, 7)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
            product_max_chars: 60,
        }
    }

    fn count(story: &[Block], pred: impl Fn(&Block) -> bool) -> usize {
        story.iter().filter(|b| pred(b)).count()
    }

    fn lines_in(categories: &[&str], per_category: usize) -> Vec<AuditLine> {
        let mut lines = Vec::new();
        for category in categories {
            for i in 0..per_category {
                lines.push(line(Some(category), &format!("Acme - {} {}", category, i), &format!("B{}", i), 1));
            }
        }
        lines
    }

    #[test]
    fn test_truncate_product() {
        let long = "A".repeat(61);
        let truncated = truncate_product(&long, 60);
        assert_eq!(truncated.chars().count(), 60);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_product(&"B".repeat(60), 60), "B".repeat(60));
    }

    #[test]
    fn test_story_structure_per_section_count() {
        for n in 1..=4 {
            let names = ["Edible", "Flower", "Pre-Roll", "Vape"];
            let lines = lines_in(&names[..n], 2);
            let story = compose(&lines, &ctx(&Selection::All, &Selection::All));

            assert_eq!(count(&story, |b| matches!(b, Block::SectionHeader { .. })), n);
            assert_eq!(count(&story, |b| matches!(b, Block::PageBreak)), n - 1);
            assert_eq!(count(&story, |b| matches!(b, Block::Signature)), 1);
            assert_eq!(story.last(), Some(&Block::Signature));
        }
    }

    #[test]
    fn test_metadata_block() {
        let lines = vec![
            line(Some("Vape"), "Acme - A", "B1", 5),
            line(Some("Vape"), "Acme - B", "B1", 2),
            line(Some("Edible"), "Acme - C", "B2", 1),
        ];
        let categories = Selection::explicit(["Vape", "Edible"]);
        let story = compose(&lines, &ctx(&categories, &Selection::All));

        let metadata: Vec<_> = story
            .iter()
            .filter_map(|b| match b {
                Block::Metadata(fields) => Some(fields.clone()),
                _ => None,
            })
            .flatten()
            .map(|f| (f.label, f.value))
            .collect();

        assert!(metadata.contains(&("Date".to_string(), "November 07, 2025".to_string())));
        assert!(metadata.contains(&("Time".to_string(), "02:05 PM".to_string())));
        assert!(metadata.contains(&("Unique Batches".to_string(), "2".to_string())));
        assert!(metadata.contains(&("Categories".to_string(), "Vape, Edible".to_string())));
        assert!(metadata.contains(&("Brands".to_string(), "All Brands".to_string())));
    }

    #[test]
    fn test_sections_sorted_with_uncategorized_last() {
        let lines = vec![
            line(Some("Vape"), "Acme - A", "B1", 5),
            line(None, "Acme - B", "B2", 2),
            line(Some("Edible"), "Acme - C", "B3", 1),
        ];
        let story = compose(&lines, &ctx(&Selection::All, &Selection::All));
        let headers: Vec<_> = story
            .iter()
            .filter_map(|b| match b {
                Block::SectionHeader { category, items } => Some((category.as_str(), *items)),
                _ => None,
            })
            .collect();
        assert_eq!(headers, vec![("Edible", 1), ("Vape", 1), (UNCATEGORIZED, 1)]);
    }

    #[test]
    fn test_physical_count_is_blank() {
        let lines = vec![line(Some("Vape"), "Acme - A", "B1", 5)];
        let story = compose(&lines, &ctx(&Selection::All, &Selection::All));
        let table = story
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.rows[0], ["Acme - A".to_string(), "B1".to_string(), "5".to_string(), String::new()]);
    }

    #[test]
    fn test_each_small_section_gets_its_own_page() {
        let lines = lines_in(&["Edible", "Flower", "Vape"], 3);
        let story = compose(&lines, &ctx(&Selection::All, &Selection::All));
        let pages = paginate(&story, PageSize::Letter);

        assert_eq!(pages.len(), 3);
        for (idx, page) in pages.iter().enumerate() {
            assert_eq!(page.number, idx + 1);
            let has_signature = page.texts().any(|t| t == "Audited By:");
            assert_eq!(has_signature, idx == 2);
        }
        assert!(pages[1].texts().any(|t| t == "Category: Flower"));
    }

    #[test]
    fn test_single_section_single_page() {
        let lines = lines_in(&["Vape"], 5);
        let story = compose(&lines, &ctx(&Selection::All, &Selection::All));
        let pages = paginate(&story, PageSize::A4);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].texts().filter(|t| *t == "Verified By:").count(), 1);
    }

    #[test]
    fn test_long_table_repeats_header() {
        let lines = lines_in(&["Vape"], 200);
        let story = compose(&lines, &ctx(&Selection::All, &Selection::All));
        let pages = paginate(&story, PageSize::Letter);

        assert!(pages.len() > 1);
        for page in &pages {
            if page.texts().any(|t| t.starts_with("Acme - Vape")) {
                assert!(page.texts().any(|t| t == "Product"));
            }
        }
        let rows: usize = pages
            .iter()
            .map(|p| p.texts().filter(|t| t.starts_with("Acme - Vape")).count())
            .sum();
        assert_eq!(rows, 200);
    }

    fn assert_inside_margins(pages: &[Page], page_size: PageSize) {
        let (width, _) = page_size.dimensions();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { x, y, font, size, text, .. } = op {
                    let right = x + text_width(text, *font, *size);
                    assert!(
                        right <= width - MARGIN_SIDE + 0.01,
                        "text {:?} ends at {} on page {}",
                        text,
                        right,
                        page.number
                    );
                    assert!(*x >= MARGIN_SIDE - 0.01, "text {:?} starts at {}", text, x);
                    if !text.starts_with("Page ") {
                        assert!(*y >= MARGIN_BOTTOM, "text {:?} below bottom margin", text);
                    }
                }
            }
        }
    }

    #[test]
    fn test_long_selection_wraps_inside_margins() {
        let names = [
            "Flower (Indica)",
            "Flower (Sativa)",
            "Flower (Hybrid)",
            "Pre-Roll",
            "Vape Cartridge",
            "Edible",
            "Tincture",
            "Concentrate",
        ];
        let lines = lines_in(&names, 2);
        let categories = Selection::explicit(names);
        let brands = Selection::explicit(["Acme", "Pretty Dope", "Zen Leaf", "High Tide"]);

        for page_size in [PageSize::Letter, PageSize::A4] {
            let pages = paginate(&compose(&lines, &ctx(&categories, &brands)), page_size);
            assert_inside_margins(&pages, page_size);

            let first: Vec<&str> = pages[0].texts().collect();
            assert!(first.contains(&"Brands: "));
            let brand_text: String = first
                .iter()
                .skip_while(|t| **t != "Brands: ")
                .skip(1)
                .take_while(|t| !t.contains(':'))
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            assert!(brand_text.contains("High Tide"));
        }
    }

    #[test]
    fn test_long_category_name_wraps_in_section_header() {
        let category = "Limited Release Seasonal Collaboration Concentrates And Live Resin Cartridges";
        let lines = lines_in(&[category], 1);
        let pages = paginate(&compose(&lines, &ctx(&Selection::All, &Selection::All)), PageSize::Letter);

        assert_inside_margins(&pages, PageSize::Letter);
        assert!(pages[0].texts().any(|t| t.contains("(1 items)")));
    }

    #[test]
    fn test_oversized_cell_is_truncated_to_one_page() {
        let batch = "X".repeat(5000);
        let lines = vec![
            line(Some("Vape"), "Acme - A", &batch, 1),
            line(Some("Vape"), "Acme - B", "B2", 2),
        ];
        let pages = paginate(&compose(&lines, &ctx(&Selection::All, &Selection::All)), PageSize::Letter);

        assert_inside_margins(&pages, PageSize::Letter);
        assert!(pages.iter().flat_map(|p| p.texts()).any(|t| t.ends_with("...") && t.starts_with('X')));
        assert!(pages.iter().flat_map(|p| p.texts()).any(|t| t == "Acme - B"));
    }

    #[test]
    fn test_long_batch_number_wraps() {
        let batch = "1A4060300002EE1000012345 LOT-2025-11-07-ALPHA";
        let lines = vec![line(Some("Vape"), "Acme - A", batch, 1)];
        let story = compose(&lines, &ctx(&Selection::All, &Selection::All));
        let pages = paginate(&story, PageSize::Letter);

        let batch_parts: Vec<&str> = pages[0]
            .texts()
            .filter(|t| batch.contains(*t) && !t.is_empty() && *t != "1")
            .collect();
        assert!(batch_parts.len() > 1);
        assert_eq!(batch_parts.concat().replace(' ', ""), batch.replace(' ', ""));
    }
}
