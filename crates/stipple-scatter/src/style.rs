//! Style resolution: trace attributes to batch options.
//!
//! The resolver fills in everything visual. Geometry that depends on the
//! axes or on neighbouring traces (trimmed line positions, fill polygons,
//! error extents, label offsets) is left empty for the batch builder.

use crate::{SelectionStyle, Trace};
use std::sync::Arc;
use stipple_render::{Color, ErrorSpec, FillSpec, LineSpec, MarkerSpec, PerPoint, TextSpec};

/// Batch options for one trace, before geometry is attached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedStyle {
    pub line: Option<LineSpec>,
    pub fill: Option<FillSpec>,
    pub marker: Option<MarkerSpec>,
    /// Selected points. `None` draws them with the base marker options.
    pub marker_selected: Option<MarkerSpec>,
    pub marker_unselected: Option<MarkerSpec>,
    pub error_x: Option<ErrorSpec>,
    pub error_y: Option<ErrorSpec>,
    pub text: Option<TextSpec>,
    /// Only present when the trace styles selected labels explicitly.
    pub text_selected: Option<TextSpec>,
    pub text_unselected: Option<TextSpec>,
}

pub trait StyleResolver: Send + Sync {
    /// Resolve `trace`, whose interleaved linearized positions are
    /// `positions`.
    fn resolve(&self, trace: &Trace, positions: &Arc<[f64]>) -> ResolvedStyle;
}

/// Resolver used when the host does not bring its own.
///
/// Marker and label opacity is folded into color alpha. Unselected markers
/// without an explicit style keep their color with alpha scaled by
/// `deselect_dim`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultStyleResolver {
    pub deselect_dim: f32,
}

impl Default for DefaultStyleResolver {
    fn default() -> Self {
        Self {
            deselect_dim: crate::DEFAULT_DESELECT_DIM,
        }
    }
}

impl DefaultStyleResolver {
    pub fn new(deselect_dim: f32) -> Self {
        Self { deselect_dim }
    }

    fn marker(
        &self,
        trace: &Trace,
        positions: &Arc<[f64]>,
        override_style: Option<(&SelectionStyle, Option<f32>)>,
    ) -> MarkerSpec {
        let marker = &trace.marker;
        let len = trace.len();

        let (color, opacity, size) = match override_style {
            None => (marker.color.clone(), marker.opacity.clone(), marker.size.clone()),
            Some((style, dim)) => {
                let opacity = match (style.marker_opacity, dim) {
                    (Some(opacity), _) => PerPoint::scalar(opacity),
                    (None, Some(dim)) if !style.has_marker_style() => {
                        marker.opacity.map(|o| o * dim)
                    }
                    (None, _) => marker.opacity.clone(),
                };
                (
                    style.marker_color.map_or_else(|| marker.color.clone(), PerPoint::scalar),
                    opacity,
                    style.marker_size.map_or_else(|| marker.size.clone(), PerPoint::scalar),
                )
            }
        };

        MarkerSpec {
            positions: Arc::clone(positions),
            size,
            color: fold_opacity(&color, &opacity, trace.opacity, len),
            border_color: marker
                .line
                .color
                .map(|c| c.scale_alpha(trace.opacity)),
            border_width: marker.line.width.clone(),
            symbol: marker.symbol.clone(),
        }
    }

    fn text(&self, trace: &Trace, positions: &Arc<[f64]>, color: Option<Color>) -> Option<TextSpec> {
        let text = trace.text.as_ref()?;
        let font = &trace.textfont;
        let color = match color {
            Some(color) => PerPoint::scalar(color),
            None => font.color.clone(),
        };
        Some(TextSpec {
            positions: Arc::clone(positions),
            text: text.clone(),
            color: color.map(|c| c.scale_alpha(trace.opacity)),
            font_family: font.family.clone(),
            font_size: font.size.clone(),
            align: PerPoint::default(),
            baseline: PerPoint::default(),
            offset: PerPoint::scalar([0.0, 0.0]),
        })
    }
}

impl StyleResolver for DefaultStyleResolver {
    fn resolve(&self, trace: &Trace, positions: &Arc<[f64]>) -> ResolvedStyle {
        let mut style = ResolvedStyle::default();

        if trace.has_lines() {
            style.line = Some(LineSpec {
                positions: Vec::new(),
                color: trace.line.color,
                width: trace.line.width,
                dashes: trace.line.dash.clone(),
                opacity: trace.opacity,
            });
        }

        if trace.fill != stipple_render::FillMode::None {
            style.fill = Some(FillSpec {
                positions: Vec::new(),
                color: trace.fillcolor.unwrap_or(trace.line.color.scale_alpha(0.5)),
                opacity: trace.opacity,
                hole: Vec::new(),
                mode: trace.fill,
            });
        }

        if trace.has_markers() {
            style.marker = Some(self.marker(trace, positions, None));
            if trace.selected.has_marker_style() {
                style.marker_selected =
                    Some(self.marker(trace, positions, Some((&trace.selected, None))));
            }
            style.marker_unselected = Some(self.marker(
                trace,
                positions,
                Some((&trace.unselected, Some(self.deselect_dim))),
            ));
        }

        let error = |bars: &crate::ErrorBars| ErrorSpec {
            positions: Arc::clone(positions),
            errors: Vec::new(),
            color: bars.color.scale_alpha(trace.opacity),
            thickness: bars.thickness,
            cap_width: bars.width,
        };
        style.error_x = trace.error_x.as_ref().filter(|bars| bars.visible).map(error);
        style.error_y = trace.error_y.as_ref().filter(|bars| bars.visible).map(error);

        if trace.has_text() {
            style.text = self.text(trace, positions, None);
            if let Some(color) = trace.selected.text_color {
                style.text_selected = self.text(trace, positions, Some(color));
            }
            if let Some(color) = trace.unselected.text_color {
                style.text_unselected = self.text(trace, positions, Some(color));
            }
        }

        style
    }
}

/// Multiply marker colors by their opacity and the trace opacity.
///
/// Array entries past the end of a short color array are transparent.
fn fold_opacity(
    color: &PerPoint<Color>,
    opacity: &PerPoint<f32>,
    trace_opacity: f32,
    len: usize,
) -> PerPoint<Color> {
    match (color, opacity) {
        (PerPoint::Scalar(color), PerPoint::Scalar(opacity)) => {
            PerPoint::scalar(color.scale_alpha(opacity * trace_opacity))
        }
        _ => PerPoint::array(
            (0..len)
                .map(|i| {
                    let color = color.get(i).copied().unwrap_or(Color::TRANSPARENT);
                    let opacity = opacity.get(i).copied().unwrap_or(1.0);
                    color.scale_alpha(opacity * trace_opacity)
                })
                .collect(),
        ),
    }
}
