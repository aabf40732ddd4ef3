use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::assets::color::Color;

/// A position component: either a literal or a producer evaluated once per render pass.
#[derive(Clone)]
pub enum Coord {
    /// Literal value, relative to the parent container.
    Fixed(f64),
    /// Zero-argument producer, invoked when the node is normalized.
    Deferred(Rc<dyn Fn() -> f64>),
}

impl Coord {
    /// Wrap a producer that is evaluated during normalization.
    pub fn deferred(f: impl Fn() -> f64 + 'static) -> Self {
        Self::Deferred(Rc::new(f))
    }

    /// Evaluate the coordinate. Producers run every time this is called.
    pub fn resolve(&self) -> f64 {
        match self {
            Self::Fixed(v) => *v,
            Self::Deferred(f) => f(),
        }
    }
}

impl Default for Coord {
    fn default() -> Self {
        Self::Fixed(0.0)
    }
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        Self::Fixed(v)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Self::Fixed)
    }
}

/// Corner radius: one value for all corners, or 1-4 values clockwise from top-left.
#[derive(Clone, Debug, PartialEq)]
pub enum Radius {
    /// Same radius on every corner.
    Uniform(f64),
    /// CSS-style shorthand list of 1 to 4 values.
    Corners(Vec<f64>),
}

impl Default for Radius {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl From<f64> for Radius {
    fn from(v: f64) -> Self {
        Self::Uniform(v)
    }
}

impl<'de> Deserialize<'de> for Radius {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Uniform(v)),
            Repr::Arr(v) if (1..=4).contains(&v.len()) => Ok(Self::Corners(v)),
            Repr::Arr(_) => Err(serde::de::Error::custom(
                "borderRadius list must have 1 to 4 values",
            )),
        }
    }
}

/// Whether a container clips its children to its rounded box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Children may draw outside the box.
    #[default]
    Visible,
    /// Children are clipped to the box.
    Hidden,
}

/// How an image maps its intrinsic aspect ratio into its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Stretch to the box.
    #[default]
    Fill,
    /// Scale to fit entirely inside the box, centered.
    Contain,
    /// Scale to cover the whole box, centered and cropped.
    Cover,
}

/// Horizontal text alignment inside a fixed-width text box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center within the box.
    Center,
    /// Align to the right edge.
    Right,
}

/// Text decoration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// A bar struck through each line.
    LineThrough,
}

/// Numeric font weight (100-900).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// `normal` (400).
    pub const NORMAL: Self = Self(400);
    /// `bold` (700).
    pub const BOLD: Self = Self(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        let raw = match Repr::deserialize(deserializer)? {
            Repr::Num(v) => v,
            Repr::Str(s) => match s.trim() {
                "normal" => 400.0,
                "bold" => 700.0,
                other => other.parse().map_err(|_| {
                    serde::de::Error::custom(format!("invalid fontWeight \"{other}\""))
                })?,
            },
        };
        if !(1.0..=1000.0).contains(&raw) {
            return Err(serde::de::Error::custom("fontWeight must be within 1..=1000"));
        }
        Ok(Self(raw.round() as u16))
    }
}

/// One element of the scene tree.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneNode {
    /// Box with optional background and clipping that holds children.
    Container(ContainerNode),
    /// Raster image.
    Image(ImageNode),
    /// Text block.
    Text(TextNode),
}

impl SceneNode {
    /// Local `(left, top)` coordinates.
    pub fn position(&self) -> (&Coord, &Coord) {
        match self {
            Self::Container(n) => (&n.left, &n.top),
            Self::Image(n) => (&n.left, &n.top),
            Self::Text(n) => (&n.left, &n.top),
        }
    }
}

impl From<ContainerNode> for SceneNode {
    fn from(n: ContainerNode) -> Self {
        Self::Container(n)
    }
}

impl From<ImageNode> for SceneNode {
    fn from(n: ImageNode) -> Self {
        Self::Image(n)
    }
}

impl From<TextNode> for SceneNode {
    fn from(n: TextNode) -> Self {
        Self::Text(n)
    }
}

/// Container node.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerNode {
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub left: Coord,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub top: Coord,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Fill painted inside the rounded box.
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Corner radius of the box.
    #[serde(default)]
    pub border_radius: Option<Radius>,
    /// Whether children are clipped to the box.
    #[serde(default)]
    pub overflow: Overflow,
    /// Children in draw order.
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl ContainerNode {
    /// Container of the given size at `(0, 0)` with no styling.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: Coord::default(),
            top: Coord::default(),
            width,
            height,
            background_color: None,
            border_radius: None,
            overflow: Overflow::Visible,
            children: Vec::new(),
        }
    }

    /// Move the container to `(left, top)` within its parent.
    pub fn at(mut self, left: impl Into<Coord>, top: impl Into<Coord>) -> Self {
        self.left = left.into();
        self.top = top.into();
        self
    }

    /// Append a child.
    pub fn child(mut self, node: impl Into<SceneNode>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// Image node.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub left: Coord,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub top: Coord,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Resource key handed to the image loader.
    pub src: String,
    /// Fill painted behind the image inside the rounded box.
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Corner radius of the box.
    #[serde(default)]
    pub border_radius: Option<Radius>,
    /// Placement of the image inside the box.
    #[serde(default)]
    pub object_fit: ObjectFit,
}

impl ImageNode {
    /// Image `src` drawn into a `width` x `height` box at `(0, 0)`.
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            left: Coord::default(),
            top: Coord::default(),
            width,
            height,
            src: src.into(),
            background_color: None,
            border_radius: None,
            object_fit: ObjectFit::Fill,
        }
    }

    /// Move the image to `(left, top)` within its parent.
    pub fn at(mut self, left: impl Into<Coord>, top: impl Into<Coord>) -> Self {
        self.left = left.into();
        self.top = top.into();
        self
    }
}

/// Text node.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    /// Key under which the drawn size is recorded.
    #[serde(default)]
    pub id: Option<String>,
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub left: Coord,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub top: Coord,
    /// Wrapping width. Without it the content is drawn on one line.
    #[serde(default)]
    pub width: Option<f64>,
    /// Text to draw.
    pub content: String,
    /// Fill color, `#333` when unset.
    #[serde(default)]
    pub color: Option<Color>,
    /// Font size in logical pixels.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Line advance, `fontSize * 1.43` when unset.
    #[serde(default)]
    pub line_height: Option<f64>,
    /// Font family, `sans-serif` when unset.
    #[serde(default)]
    pub font_family: Option<String>,
    /// Custom font resource, loaded and registered as `fontFamily`.
    #[serde(default)]
    pub font_src: Option<String>,
    /// Font weight.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Alignment within `width`.
    #[serde(default)]
    pub text_align: TextAlign,
    /// Decoration drawn over each line.
    #[serde(default)]
    pub text_decoration: TextDecoration,
    /// Maximum number of lines; `0` or unset means unlimited.
    #[serde(default)]
    pub line_clamp: Option<u32>,
}

impl TextNode {
    /// Unstyled text at `(0, 0)`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Move the text to `(left, top)` within its parent.
    pub fn at(mut self, left: impl Into<Coord>, top: impl Into<Coord>) -> Self {
        self.left = left.into();
        self.top = top.into();
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
