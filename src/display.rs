//! Interactive scatter plot of accident locations.

use anyhow::{Result, anyhow};
use cyclist_accidents::accidents::FilteredAccident;
use cyclist_accidents::plot::{Bounds, PADDING, PlotPoint, Projection, marker_radius};
use iced::{
    Color, Element, Length, Point, Rectangle, Renderer, Task, Theme, mouse,
    widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
};
use std::sync::Arc;
use tracing::info;

const MARGIN: f32 = 48.0;
const AXIS_COLOUR: Color = Color::from_rgb(0.25, 0.25, 0.3);
const MARKER_COLOUR: Color = Color::from_rgb(0.12, 0.47, 0.71);

/// Opens the plot window and blocks until the user closes it.
pub fn show(accidents: &[FilteredAccident], marker_size: f64) -> Result<()> {
    let points: Arc<[PlotPoint]> = accidents.iter().map(PlotPoint::from).collect();
    let radius = marker_radius(marker_size);
    info!(points = points.len(), radius, "Opening scatter plot");

    iced::application(
        move || ScatterPlot::new(Arc::clone(&points), radius),
        ScatterPlot::update,
        ScatterPlot::view,
    )
    .title(ScatterPlot::title)
    .theme(plot_theme)
    .window_size((900.0, 700.0))
    .run()
    .map_err(|e| anyhow!("scatter plot window failed: {e}"))
}

fn plot_theme(_: &ScatterPlot) -> Theme {
    Theme::Light
}

/// The window accepts no input.
#[derive(Debug, Clone, Copy)]
enum Message {}

struct ScatterPlot {
    chart: ScatterChart,
}

impl ScatterPlot {
    fn new(points: Arc<[PlotPoint]>, radius: f32) -> Self {
        let bounds = Bounds::of(&points).map(|b| b.padded(PADDING));
        Self {
            chart: ScatterChart {
                points,
                bounds,
                radius,
            },
        }
    }

    fn title(&self) -> String {
        format!("Cyclist accidents ({} points)", self.chart.points.len())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {}
    }

    fn view(&self) -> Element<'_, Message> {
        Canvas::new(self.chart.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

#[derive(Clone)]
struct ScatterChart {
    points: Arc<[PlotPoint]>,
    bounds: Option<Bounds>,
    radius: f32,
}

impl canvas::Program<Message> for ScatterChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        let Some(data) = self.bounds else {
            frame.fill_text(label("No accidents to plot", Point::new(MARGIN, MARGIN)));
            return vec![frame.into_geometry()];
        };

        let projection = Projection::new(data, bounds.width, bounds.height, MARGIN);
        let (left, bottom) = projection.project(PlotPoint {
            x: data.min_x,
            y: data.min_y,
        });
        let (right, top) = projection.project(PlotPoint {
            x: data.max_x,
            y: data.max_y,
        });

        let axes = Path::new(|builder| {
            builder.move_to(Point::new(left, top));
            builder.line_to(Point::new(left, bottom));
            builder.line_to(Point::new(right, bottom));
        });
        frame.stroke(
            &axes,
            Stroke::default().with_color(AXIS_COLOUR).with_width(1.0),
        );

        let markers = Path::new(|builder| {
            for point in self
                .points
                .iter()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
            {
                let (x, y) = projection.project(*point);
                builder.circle(Point::new(x, y), self.radius);
            }
        });
        frame.fill(&markers, MARKER_COLOUR);

        // lon along the bottom, lat up the left side
        frame.fill_text(label(
            format!("{:.3}", data.min_x),
            Point::new(left, bottom + 6.0),
        ));
        frame.fill_text(label(
            format!("{:.3}", data.max_x),
            Point::new(right - 40.0, bottom + 6.0),
        ));
        frame.fill_text(label(format!("{:.3}", data.max_y), Point::new(4.0, top)));
        frame.fill_text(label(
            format!("{:.3}", data.min_y),
            Point::new(4.0, bottom - 14.0),
        ));

        vec![frame.into_geometry()]
    }
}

fn label(content: impl Into<String>, position: Point) -> canvas::Text {
    canvas::Text {
        content: content.into(),
        position,
        color: AXIS_COLOUR,
        size: 12.0.into(),
        ..canvas::Text::default()
    }
}
