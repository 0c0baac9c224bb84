//! Text width measurement for label sizing.
//!
//! Placement only ever needs the advance width of a short string at a known
//! font size. [`FontTextMetrics`] resolves a real face through fontdb and
//! reads glyph advances with ttf-parser; when no usable face exists (bare CI
//! containers, headless servers) it degrades to a fixed per-char advance so
//! placement stays deterministic. [`TextWidthCache`] memoizes widths by
//! (font size, text), which is the hot path during a redraw: the same street
//! names are measured on every pass.

use std::collections::HashMap;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use ttf_parser::{Face, GlyphId};

/// Advance used for characters no face can resolve, in em.
const FALLBACK_ADVANCE_EM: f64 = 0.56;

pub trait TextMetrics {
    fn measure(&mut self, text: &str, font_size: f64) -> f64;
}

/// Memoizing wrapper around any measurer, keyed by (font size, text).
pub struct TextWidthCache<M> {
    inner: M,
    cache: HashMap<(u64, String), f64>,
}

impl<M: TextMetrics> TextWidthCache<M> {
    pub fn new(inner: M) -> Self {
        Self { inner, cache: HashMap::new() }
    }
}

impl<M: TextMetrics> TextMetrics for TextWidthCache<M> {
    fn measure(&mut self, text: &str, font_size: f64) -> f64 {
        let key = (font_size.to_bits(), text.to_string());
        if let Some(width) = self.cache.get(&key) {
            return *width;
        }
        let width = self.inner.measure(text, font_size);
        self.cache.insert(key, width);
        width
    }
}

/// Fixed-advance measurer: every character is `em × size` wide.
///
/// Used as the font-less fallback and as a deterministic measurer in tests.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicTextMetrics {
    em: f64,
}

impl HeuristicTextMetrics {
    pub fn new() -> Self {
        Self { em: FALLBACK_ADVANCE_EM }
    }

    pub fn with_em(em: f64) -> Self {
        Self { em }
    }
}

impl Default for HeuristicTextMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMetrics for HeuristicTextMetrics {
    fn measure(&mut self, text: &str, font_size: f64) -> f64 {
        text.chars().filter(|ch| *ch != '\n').count() as f64 * self.em * font_size
    }
}

/// Glyph-accurate measurer over a system font family.
pub struct FontTextMetrics {
    family: String,
    db: Database,
    loaded_system_fonts: bool,
    face: Option<Option<FontFace>>,
}

impl FontTextMetrics {
    pub fn new(font_family: &str) -> Self {
        Self {
            family: font_family.to_string(),
            db: Database::new(),
            loaded_system_fonts: false,
            face: None,
        }
    }

    fn face_mut(&mut self) -> Option<&mut FontFace> {
        if self.face.is_none() {
            let loaded = self.load_face();
            self.face = Some(loaded);
        }
        self.face.as_mut().and_then(|face| face.as_mut())
    }

    fn load_face(&mut self) -> Option<FontFace> {
        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Family<'_>> = Vec::new();
        for part in self.family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    generics.push(Family::SansSerif)
                }
                "monospace" | "ui-monospace" => generics.push(Family::Monospace),
                "cursive" => generics.push(Family::Cursive),
                "fantasy" => generics.push(Family::Fantasy),
                _ => names.push(raw.to_string()),
            }
        }
        let mut families: Vec<Family<'_>> =
            names.iter().map(|n| Family::Name(n.as_str())).collect();
        families.extend(generics);
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            loaded = FontFace::parse(data.to_vec(), index);
        });
        loaded
    }
}

impl TextMetrics for FontTextMetrics {
    fn measure(&mut self, text: &str, font_size: f64) -> f64 {
        if text.is_empty() || font_size <= 0.0 {
            return 0.0;
        }
        match self.face_mut() {
            Some(face) => face.measure_width(text, font_size),
            None => HeuristicTextMetrics::new().measure(text, font_size),
        }
    }
}

struct FontFace {
    // `face` borrows from `_data`; both live and die together.
    _data: Vec<u8>,
    units_per_em: u16,
    face: Face<'static>,
    ascii_advances: [u16; 128],
    glyph_cache: HashMap<char, Option<u16>>,
    advance_cache: HashMap<u16, u16>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let face = unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(face) };
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            _data: data,
            units_per_em,
            face,
            ascii_advances,
            glyph_cache: HashMap::new(),
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f64) -> f64 {
        let scale = font_size / self.units_per_em as f64;
        let fallback = font_size * FALLBACK_ADVANCE_EM;

        if text.is_ascii() {
            let mut width = 0.0;
            for byte in text.as_bytes() {
                if *byte == b'\n' {
                    continue;
                }
                let advance = self.ascii_advances[*byte as usize];
                width += if advance == 0 {
                    fallback
                } else {
                    advance as f64 * scale
                };
            }
            return width.max(0.0);
        }

        let mut width = 0.0;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let glyph = match self.glyph_cache.get(&ch) {
                Some(cached) => *cached,
                None => {
                    let glyph = self.face.glyph_index(ch).map(|id| id.0);
                    self.glyph_cache.insert(ch, glyph);
                    glyph
                }
            };
            let Some(glyph_id) = glyph else {
                width += fallback;
                continue;
            };
            let advance = match self.advance_cache.get(&glyph_id) {
                Some(cached) => *cached,
                None => {
                    let value = self.face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
                    self.advance_cache.insert(glyph_id, value);
                    value
                }
            };
            width += advance as f64 * scale;
        }
        width.max(0.0)
    }
}
