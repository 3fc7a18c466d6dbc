use tracing::trace;

use crate::core::CoordinateConverter;
use crate::culling::CullingState;
use crate::host::ChartHost;
use crate::labels::AxisLabelLayout;

use super::{OverlayEngine, OverlayFrame, ToolView};

impl<H: ChartHost> OverlayEngine<H> {
    /// Per-redraw pass: culls every tool, projects it to pixels and places
    /// axis labels.
    ///
    /// Label stacking is resolved inside this call, after all tool state for
    /// the frame is final, so the returned frame carries a single consistent
    /// label layout.
    pub fn update_views(&mut self) -> OverlayFrame {
        let converter = CoordinateConverter::new(&self.host);
        let viewport_bounds = converter.viewport_bounds();
        let pane_height = f64::from(self.host.viewport().height);

        let mut tools = Vec::with_capacity(self.tools.len());
        let mut layout = AxisLabelLayout::default();
        for tool in self.tools.iter() {
            if tool.is_destroyed() || !tool.options().visible {
                continue;
            }
            let culling = viewport_bounds.map_or(CullingState::FullyOffScreen, |bounds| tool.culling_state(bounds));
            let points_screen = converter
                .points_to_screen(&tool.points_with_ghost())
                .map(|points| points.to_vec())
                .unwrap_or_default();
            let anchors_screen = converter
                .points_to_screen(&tool.anchors())
                .map(|anchors| anchors.to_vec())
                .unwrap_or_default();

            if culling.is_visible() {
                let labels = self.labels.tool_labels(tool, &converter);
                layout.price_labels.extend(labels.price_labels);
                layout.time_labels.extend(labels.time_labels);
            }

            tools.push(ToolView {
                id: tool.id().to_owned(),
                kind: tool.kind().to_owned(),
                tool_type: tool.tool_type(),
                culling,
                points_screen,
                anchors_screen,
                selected: tool.is_selected(),
                hovered: tool.is_hovered(),
                editing: tool.is_editing(),
                creating: tool.is_creating(),
            });
        }

        let labels = self.labels.resolve(layout, pane_height, &mut self.stacking);
        trace!(
            tools = tools.len(),
            visible = tools.iter().filter(|view| view.culling.is_visible()).count(),
            "views updated"
        );
        OverlayFrame {
            viewport_bounds,
            tools,
            labels,
        }
    }
}
