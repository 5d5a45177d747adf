use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellStyle {
    pub font_size: Option<f64>,
    pub bold: bool,
    pub align: Option<Align>,
    /// `0xRRGGBB`
    pub font_color: Option<u32>,
    pub bg_color: Option<u32>,
    pub num_format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StyleKey {
    Title,
    Header,
    Currency,
    Count,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub scale_low: u32,
    pub scale_mid: u32,
    pub scale_high: u32,
    pub data_bar: u32,
    pub series: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            scale_low: 0xF8696B,
            scale_mid: 0xFFEB84,
            scale_high: 0x63BE7B,
            data_bar: 0x70AD47,
            series: 0x4472C4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStyles {
    pub title: CellStyle,
    pub header: CellStyle,
    pub currency: CellStyle,
    pub count: CellStyle,
    pub date: CellStyle,
    pub palette: Palette,
}

impl ReportStyles {
    pub fn get(&self, key: StyleKey) -> &CellStyle {
        match key {
            StyleKey::Title => &self.title,
            StyleKey::Header => &self.header,
            StyleKey::Currency => &self.currency,
            StyleKey::Count => &self.count,
            StyleKey::Date => &self.date,
        }
    }
}

impl Default for ReportStyles {
    fn default() -> Self {
        Self {
            title: CellStyle {
                font_size: Some(16.0),
                bold: true,
                align: Some(Align::Center),
                font_color: Some(0x1F4E79),
                bg_color: Some(0xD9E2F3),
                num_format: None,
            },
            header: CellStyle {
                bold: true,
                align: Some(Align::Center),
                font_color: Some(0xFFFFFF),
                bg_color: Some(0x4472C4),
                ..CellStyle::default()
            },
            currency: CellStyle {
                align: Some(Align::Right),
                num_format: Some("#,##0".to_string()),
                ..CellStyle::default()
            },
            count: CellStyle {
                align: Some(Align::Center),
                num_format: Some("#,##0".to_string()),
                ..CellStyle::default()
            },
            date: CellStyle {
                num_format: Some("yyyy-mm-dd".to_string()),
                ..CellStyle::default()
            },
            palette: Palette::default(),
        }
    }
}
