use csv::{ReaderBuilder, Trim};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;
pub mod plot;

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

pub const SIZE_COLUMN: &str = "Size";
pub const TIME_COLUMN: &str = "Time";

const CANVAS: (u32, u32) = (1200, 800);
const MARGIN: u32 = 20;
const LABEL_PAD: u32 = 12;
const CAPTION_FONT: u32 = 32;
const DESC_FONT: u32 = 22;
const TICK_FONT: u32 = 18;
const MARKER_RADIUS: u32 = 4;
const Y_TOP_MARGIN: f64 = 0.05;
const AXIS_LABELS: usize = 10;

/// cell texts read as a missing value, same set pandas uses by default
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Everything that can go wrong between reading the csv and writing the chart.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not read csv file {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("column {column} not found in {path}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("invalid value {value:?} in column {column} at line {line} of {path}")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("unsupported output format for {path}, use svg, png, jpg, bmp, gif or tiff")]
    UnsupportedFormat { path: PathBuf },
    #[error("could not render the chart to {path}: {message}")]
    Render { path: PathBuf, message: String },
}

/// Output backend, selected from the extension of the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Bitmap,
}

impl OutputFormat {
    pub fn from_path(fout: &Path) -> Result<OutputFormat, DataError> {
        let ext = fout
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("svg") => Ok(OutputFormat::Svg),
            Some("png") | Some("jpg") | Some("jpeg") | Some("bmp") | Some("gif")
            | Some("tif") | Some("tiff") => Ok(OutputFormat::Bitmap),
            _ => Err(DataError::UnsupportedFormat {
                path: fout.to_path_buf(),
            }),
        }
    }
}

/// Title and axis descriptions, used verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    pub title: String,
    pub x: String,
    pub y: String,
}

/// The main struct for the size/time measurements, one entry per csv row
#[derive(Debug, Clone, PartialEq)]
pub struct SizeTime {
    pub size: Vec<f64>,
    pub time: Vec<f64>,
}

impl SizeTime {
    pub fn new(capacity: usize) -> SizeTime {
        let size: Vec<f64> = Vec::with_capacity(capacity);
        let time: Vec<f64> = Vec::with_capacity(capacity);
        SizeTime { size, time }
    }

    pub fn len(&self) -> usize {
        self.size.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Init a SizeTime from a csv with a header row.
    /// Only the Size and Time columns are read, in file order.
    /// Empty cells and NA markers become NAN, any other non numeric text is an error.
    pub fn from_csv(fin: &Path) -> Result<SizeTime, DataError> {
        let read_err = |source| DataError::Read {
            path: fin.to_path_buf(),
            source,
        };
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::Fields)
            .from_path(fin)
            .map_err(read_err)?;
        let headers = rdr.headers().map_err(read_err)?.clone();
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DataError::MissingColumn {
                    path: fin.to_path_buf(),
                    column,
                })
        };
        let size_idx = find(SIZE_COLUMN)?;
        let time_idx = find(TIME_COLUMN)?;

        let mut sizetime = SizeTime::new(1000);
        for record in rdr.records() {
            let record = record.map_err(read_err)?;
            let line = record.position().map_or(0, |p| p.line());
            let parse = |idx: usize, column: &'static str| -> Result<f64, DataError> {
                let raw = record.get(idx).unwrap_or("");
                if NA_VALUES.contains(&raw) {
                    return Ok(f64::NAN);
                }
                raw.parse().map_err(|_| DataError::InvalidValue {
                    path: fin.to_path_buf(),
                    line,
                    column,
                    value: raw.to_string(),
                })
            };
            sizetime.size.push(parse(size_idx, SIZE_COLUMN)?);
            sizetime.time.push(parse(time_idx, TIME_COLUMN)?);
        }
        Ok(sizetime)
    }

    /// runs of consecutive rows where both size and time are finite,
    /// each run is drawn as one connected line
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for (&s, &t) in self.size.iter().zip(self.time.iter()) {
            if s.is_finite() && t.is_finite() {
                current.push((s, t));
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// x axis from the smallest to the largest size, without margins
    pub fn x_range(&self) -> Range<f64> {
        match finite_min_and_max(&self.size) {
            Some((min, max)) if max > min => min..max,
            Some((min, _)) => min..min + 1.,
            None => 0f64..1f64,
        }
    }

    /// y axis from zero to the largest time plus the usual top margin
    pub fn y_range(&self) -> Range<f64> {
        let upper = match finite_min_and_max(&self.time) {
            Some((min, max)) => max + (max - min) * Y_TOP_MARGIN,
            None => 1.,
        };
        if upper > 0. {
            0f64..upper
        } else {
            0f64..1f64
        }
    }

    /// plots time against size as a line with circle markers,
    /// svg or bitmap depending on the extension of fout
    pub fn plot(&self, labels: &Labels, fout: &Path) -> Result<(), DataError> {
        match OutputFormat::from_path(fout)? {
            OutputFormat::Svg => {
                let root = SVGBackend::new(fout, CANVAS).into_drawing_area();
                self.draw_on(&root, labels)
                    .map_err(|e| render_error(fout, e))
            }
            OutputFormat::Bitmap => {
                let root = BitMapBackend::new(fout, CANVAS).into_drawing_area();
                self.draw_on(&root, labels)
                    .map_err(|e| render_error(fout, e))
            }
        }
    }

    fn draw_on<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        labels: &Labels,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let x_range = self.x_range();
        let y_range = self.y_range();
        let layout = fit_layout(root, labels, &x_range, &y_range)?;
        let x_decimals = tick_decimals(&x_range);
        let y_decimals = tick_decimals(&y_range);

        root.fill(&WHITE)?;
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(MARGIN)
            .margin_right(layout.right_margin)
            .x_label_area_size(layout.x_label_area)
            .y_label_area_size(layout.y_label_area);
        if !labels.title.is_empty() {
            builder.caption(&labels.title, ("sans-serif", CAPTION_FONT));
        }
        let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

        {
            let x_formatter = |v: &f64| tick_label(*v, x_decimals);
            let y_formatter = |v: &f64| tick_label(*v, y_decimals);
            let mut mesh = chart.configure_mesh();
            mesh.light_line_style(&TRANSPARENT)
                .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
                .set_all_tick_mark_size(4)
                .label_style(("sans-serif", TICK_FONT))
                .axis_desc_style(("sans-serif", DESC_FONT))
                .x_labels(AXIS_LABELS)
                .y_labels(AXIS_LABELS)
                .x_label_formatter(&x_formatter)
                .y_label_formatter(&y_formatter);
            if !labels.x.is_empty() {
                mesh.x_desc(labels.x.as_str());
            }
            if !labels.y.is_empty() {
                mesh.y_desc(labels.y.as_str());
            }
            mesh.draw()?;
        }

        let line_color = RGBColor(31, 119, 180);
        for segment in self.segments() {
            chart.draw_series(LineSeries::new(
                segment.iter().copied(),
                line_color.stroke_width(2),
            ))?;
            chart.draw_series(
                segment
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), MARKER_RADIUS, line_color.filled())),
            )?;
        }
        root.present()?;
        Ok(())
    }
}

fn render_error<E: std::error::Error + Send + Sync>(
    fout: &Path,
    e: DrawingAreaErrorKind<E>,
) -> DataError {
    DataError::Render {
        path: fout.to_path_buf(),
        message: e.to_string(),
    }
}

/// label-area sizes measured from the text that goes in them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    x_label_area: u32,
    y_label_area: u32,
    right_margin: u32,
}

fn fit_layout<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: &Labels,
    x_range: &Range<f64>,
    y_range: &Range<f64>,
) -> Result<Layout, DrawingAreaErrorKind<DB::ErrorType>> {
    let tick_style = TextStyle::from(("sans-serif", TICK_FONT).into_font());
    let desc_style = TextStyle::from(("sans-serif", DESC_FONT).into_font());

    let widest = |range: &Range<f64>| -> Result<(u32, u32), DrawingAreaErrorKind<DB::ErrorType>> {
        let mut extent = (0, 0);
        let decimals = tick_decimals(range);
        for v in ticks(range) {
            let (w, h) = root.estimate_text_size(&tick_label(v, decimals), &tick_style)?;
            extent = (extent.0.max(w), extent.1.max(h));
        }
        Ok(extent)
    };
    let desc_height = |text: &str| -> Result<u32, DrawingAreaErrorKind<DB::ErrorType>> {
        if text.is_empty() {
            Ok(0)
        } else {
            Ok(root.estimate_text_size(text, &desc_style)?.1)
        }
    };

    let (x_tick_w, x_tick_h) = widest(x_range)?;
    let (y_tick_w, _) = widest(y_range)?;
    Ok(Layout {
        x_label_area: x_tick_h + desc_height(&labels.x)? + 2 * LABEL_PAD,
        y_label_area: y_tick_w + desc_height(&labels.y)? + 2 * LABEL_PAD,
        right_margin: MARGIN.max(x_tick_w / 2 + LABEL_PAD),
    })
}

/// evenly spaced sample of the values an axis may label
fn ticks(range: &Range<f64>) -> impl Iterator<Item = f64> {
    let (start, span) = (range.start, range.end - range.start);
    (0..=10).map(move |i| start + span * i as f64 / 10.)
}

/// decimals needed to tell apart the labels of an axis over range.
/// The axis never puts more than AXIS_LABELS labels on it, so the label
/// step is at least span / AXIS_LABELS; one extra digit covers steps like 2.5
pub fn tick_decimals(range: &Range<f64>) -> usize {
    let min_step = (range.end - range.start).abs() / AXIS_LABELS as f64;
    if !min_step.is_finite() || min_step <= 0. {
        return 0;
    }
    let decimals = -min_step.log10().floor() + 1.;
    if decimals > 0. {
        decimals as usize
    } else {
        0
    }
}

/// tick label with the given decimals, trailing zeros and negative zero dropped
pub fn tick_label(v: f64, decimals: usize) -> String {
    let mut label = format!("{:.*}", decimals, v);
    if label.contains('.') {
        label = label.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if label == "-0" {
        label = "0".to_string();
    }
    label
}

/// min and max of the finite values, None if there are none
pub fn finite_min_and_max(s: &[f64]) -> Option<(f64, f64)> {
    let mut finite = s.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}
