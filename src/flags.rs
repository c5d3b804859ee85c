// The built-in backgrounds: plain stripe flags, the Progress Pride chevrons,
// the intersex ring and a rainbow frame that sits on top of the picture.
// Colours and ratios follow the SVG versions of each flag.

use crate::background::{Background, BackgroundRegistry, Overlay};
use crate::custom::CustomImage;
use crate::draw::{clear_rect, draw_stripes, fill_path, fill_rect};
use crate::error::Result;
use crate::path::Path;
use crate::script::CustomScript;
use crate::types::{Color, FrameBuffer};

const RAINBOW: [Color; 6] = [
    Color::rgb(0xe6, 0x00, 0x00),
    Color::rgb(0xff, 0x8e, 0x00),
    Color::rgb(0xff, 0xef, 0x00),
    Color::rgb(0x00, 0x82, 0x1b),
    Color::rgb(0x00, 0x4b, 0xff),
    Color::rgb(0x78, 0x00, 0x89),
];

/// Chevron colours from the outside in: black, brown, light blue, pink, white.
const CHEVRONS: [Color; 5] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0x61, 0x39, 0x15),
    Color::rgb(0x74, 0xd7, 0xee),
    Color::rgb(0xff, 0xaf, 0xc8),
    Color::rgb(0xff, 0xff, 0xff),
];

/// Angle of the Progress Pride chevron edges against the hoist, in radians.
const CHEVRON_ANGLE: f32 = 0.789_634_76;

/// Shorthand so the flag table below stays readable.
macro_rules! hex {
    ($($c:literal),+ $(,)?) => { vec![$(Color(0xFF00_0000 | $c)),+] };
}

/// A flag made of equal horizontal stripes.
pub struct Stripes {
    id: &'static str,
    name: &'static str,
    colors: Vec<Color>,
}

impl Stripes {
    pub fn new(id: &'static str, name: &'static str, colors: Vec<Color>) -> Self {
        Self { id, name, colors }
    }
}

impl Background for Stripes {
    fn id(&self) -> &str { self.id }
    fn name(&self) -> &str { self.name }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        draw_stripes(canvas, &self.colors);
        Ok(None)
    }
}

/// Nothing at all: the user image on transparency.
pub struct NoBackground;

impl Background for NoBackground {
    fn id(&self) -> &str { "none" }
    fn name(&self) -> &str { "None" }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        clear_rect(canvas, 0.0, 0.0, canvas.width as f32, canvas.height as f32);
        Ok(None)
    }
}

/// How the chevron tips are placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChevronStyle {
    /// Tip x positions as fixed fractions of the width (squashes with the aspect ratio).
    Ratio,
    /// Fixed edge angle; tips move with the height.
    Angle,
}

pub struct ProgressPride {
    style: ChevronStyle,
}

impl ProgressPride {
    pub fn new(style: ChevronStyle) -> Self {
        Self { style }
    }

    /// (base x, tip x) for each chevron band, outermost first. Base is where the
    /// band meets the top and bottom edges, tip is its point at mid-height.
    fn bands(&self, w: f32, h: f32) -> [(f32, f32); 5] {
        match self.style {
            ChevronStyle::Ratio => [
                (0.16 * w, 0.4773 * w),
                (0.08 * w, 0.3973 * w),
                (0.0, 0.3173 * w),
                (-0.08 * w, 0.2373 * w),
                (-0.16 * w, 0.1573 * w),
            ],
            ChevronStyle::Angle => {
                let band = 0.08 * w;
                let run = (h / 2.0) / CHEVRON_ANGLE.tan();
                [2.0, 1.0, 0.0, -1.0, -2.0].map(|k| (k * band, k * band + run))
            }
        }
    }
}

impl Background for ProgressPride {
    fn id(&self) -> &str {
        match self.style {
            ChevronStyle::Ratio => "progress-pride-ratio",
            ChevronStyle::Angle => "progress-pride-angle",
        }
    }

    fn name(&self) -> &str {
        match self.style {
            ChevronStyle::Ratio => "Progress Pride (Ratio)",
            ChevronStyle::Angle => "Progress Pride (Angle)",
        }
    }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        draw_stripes(canvas, &RAINBOW);

        let (w, h) = (canvas.width as f32, canvas.height as f32);
        // Each band is a pentagon anchored on the hoist; later (inner) bands cover earlier ones.
        for ((base, tip), color) in self.bands(w, h).into_iter().zip(CHEVRONS) {
            let mut p = Path::new();
            p.move_to(0.0, 0.0)
                .line_to(base, 0.0)
                .line_to(tip, h / 2.0)
                .line_to(base, h)
                .line_to(0.0, h);
            fill_path(canvas, &p, color);
        }
        Ok(None)
    }
}

pub struct Intersex;

impl Background for Intersex {
    fn id(&self) -> &str { "intersex" }
    fn name(&self) -> &str { "Intersex" }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        let yellow = Color::rgb(0xff, 0xd8, 0x00);
        let purple = Color::rgb(0x79, 0x02, 0xaa);
        let (w, h) = (canvas.width as f32, canvas.height as f32);
        fill_rect(canvas, 0.0, 0.0, w, h, yellow);

        let side = w.min(h);
        let outer = side * 43.0 / 150.0;
        let inner = side * 0.2025;

        let mut ring = Path::new();
        ring.circle(w / 2.0, h / 2.0, outer);
        fill_path(canvas, &ring, purple);

        let mut hole = Path::new();
        hole.circle(w / 2.0, h / 2.0, inner);
        fill_path(canvas, &hole, yellow);
        Ok(None)
    }
}

/// Rainbow stripes that also frame the picture: the overlay repaints the stripes
/// everywhere outside a centred circle, so the user image only shows through the middle.
pub struct RainbowFrame;

/// Radius of the see-through window, as a fraction of the shorter canvas side.
const FRAME_HOLE: f32 = 0.45;

impl Background for RainbowFrame {
    fn id(&self) -> &str { "rainbow-frame" }
    fn name(&self) -> &str { "Rainbow Frame" }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        draw_stripes(canvas, &RAINBOW);

        Ok(Some(Box::new(|canvas: &mut FrameBuffer| {
            let mut stripes = FrameBuffer::new(canvas.width, canvas.height);
            draw_stripes(&mut stripes, &RAINBOW);

            let (cx, cy) = (canvas.width as f32 / 2.0, canvas.height as f32 / 2.0);
            let r = canvas.width.min(canvas.height) as f32 * FRAME_HOLE;
            let r2 = r * r;
            for y in 0..canvas.height {
                let dy = y as f32 + 0.5 - cy;
                for x in 0..canvas.width {
                    let dx = x as f32 + 0.5 - cx;
                    if dx * dx + dy * dy > r2 {
                        let idx = y * canvas.width + x;
                        canvas.pixels[idx] = stripes.pixels[idx];
                    }
                }
            }
            Ok(())
        })))
    }
}

/// Every built-in background, in picker order.
pub fn default_registry(max_script_operations: u64) -> Result<BackgroundRegistry> {
    let mut reg = BackgroundRegistry::new();
    reg.register(Box::new(NoBackground))?;
    reg.register(Box::new(CustomImage::new()))?;
    reg.register(Box::new(CustomScript::new(max_script_operations)?))?;
    reg.register(Box::new(Stripes::new("rainbow", "Rainbow", RAINBOW.to_vec())))?;
    reg.register(Box::new(ProgressPride::new(ChevronStyle::Ratio)))?;
    reg.register(Box::new(ProgressPride::new(ChevronStyle::Angle)))?;
    reg.register(Box::new(RainbowFrame))?;

    let stripes = [
        ("lesbian5", "Lesbian (5)", hex![0xd62900, 0xff9b55, 0xffffff, 0xd462a6, 0xa50062]),
        ("lesbian7", "Lesbian (7)", hex![0xd62900, 0xf07722, 0xff9b55, 0xffffff, 0xd462a6, 0xb75591, 0xa50062]),
        ("gay5", "Gay (5)", hex![0x018e71, 0x99e9c2, 0xffffff, 0x7cafe3, 0x3b1379]),
        ("gay7", "Gay (7)", hex![0x018e71, 0x21cfac, 0x99e9c2, 0xffffff, 0x7cafe3, 0x4f47cc, 0x3b1379]),
        ("bisexual", "Bisexual", hex![0xd70071, 0xd70071, 0x9c4e97, 0x0035aa, 0x0035aa]),
        ("trans", "Transgender", hex![0x5bcffa, 0xf5abb9, 0xffffff, 0xf5abb9, 0x5bcffa]),
        ("queer", "Queer", hex![0x000000, 0x9adaeb, 0x00a4e9, 0xb6e717, 0xffffff, 0xffca05, 0xfd6666, 0xffb0ca, 0x000000]),
        ("nonbinary", "Non-binary", hex![0xfff42f, 0xfefefe, 0x9c59d1, 0x292929]),
        ("nonbinary-war", "Non-binary (wartime)", hex![0xfff42f, 0x292929, 0x9c59d1, 0xfefefe]),
    ];
    for (id, name, colors) in stripes {
        reg.register(Box::new(Stripes::new(id, name, colors)))?;
    }

    reg.register(Box::new(Intersex))?;

    let stripes = [
        ("pansexual", "Pansexual", hex![0xff1b8d, 0xffd900, 0x1bb3ff]),
        ("asexual", "Asexual", hex![0x000000, 0xa5a5a5, 0xffffff, 0x810081]),
        ("aromantic", "Aromantic", hex![0x3aa740, 0xa8d47a, 0xffffff, 0xababab, 0x000000]),
        ("aroace", "Aroace", hex![0xe38d00, 0xedce00, 0xffffff, 0x62b0dd, 0x1a3555]),
    ];
    for (id, name, colors) in stripes {
        reg.register(Box::new(Stripes::new(id, name, colors)))?;
    }

    Ok(reg)
}
