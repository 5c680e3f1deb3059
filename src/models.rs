use image::DynamicImage;
use std::str::FromStr;
use std::sync::Arc;

use crate::catalog::MapEntry;
use crate::geometry::CANVAS_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Axis,
    Allies,
}

impl Faction {
    pub fn name(self) -> &'static str {
        match self {
            Faction::Axis => "axis",
            Faction::Allies => "allies",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColor {
    Blue,
    Red,
}

impl BarColor {
    pub const ALL: [BarColor; 2] = [BarColor::Blue, BarColor::Red];

    pub fn as_str(self) -> &'static str {
        match self {
            BarColor::Blue => "blue",
            BarColor::Red => "red",
        }
    }
}

impl FromStr for BarColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BarColor::ALL.into_iter().find(|c| c.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactionCapture {
    pub caps: u32,
    pub color: BarColor,
}

/// A render request whose every field has passed validation.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub map: Arc<MapEntry>,
    pub strongpoints: Vec<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub axis: Option<FactionCapture>,
    pub allies: Option<FactionCapture>,
}

impl RenderRequest {
    pub fn output_size(&self) -> (u32, u32) {
        (self.width.unwrap_or(CANVAS_SIZE), self.height.unwrap_or(CANVAS_SIZE))
    }

    /// Present faction captures, axis first.
    pub fn captures(&self) -> impl Iterator<Item = (Faction, FactionCapture)> + '_ {
        [(Faction::Axis, self.axis), (Faction::Allies, self.allies)]
            .into_iter()
            .filter_map(|(faction, capture)| capture.map(|c| (faction, c)))
    }
}

/// A positioned layer waiting to be drawn onto the base canvas.
pub struct Overlay {
    pub image: Arc<DynamicImage>,
    pub left: i64,
    pub top: i64,
}
