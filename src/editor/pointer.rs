use eframe::egui::{self, Pos2, Rect, Vec2};
use std::collections::HashSet;
use tracing::debug;

use super::{Editor, Gesture, Modifiers, Response, Selection, Tool};
use crate::geometry;
use crate::model::{Connection, FreehandPath, NodeKind, Point};
use crate::scene::IdKind;

impl Editor {
    pub(super) fn pointer_down(&mut self, screen: Pos2, modifiers: Modifiers) -> Response {
        let blurred = if self.text_edit.is_some() {
            self.blur()
        } else {
            Response::Ignored
        };
        self.cancel_gesture();
        let world = self.view.screen_to_world(screen);
        self.hover = Some(world);

        if self.space_held {
            self.gesture = Some(Gesture::Pan { last: screen });
            return blurred.max(Response::Changed);
        }

        let response = match self.tool {
            Tool::Select => self.select_down(world, modifiers),
            Tool::AddText => self.place_node(NodeKind::Text, world),
            Tool::AddSticker => self.place_node(
                NodeKind::Sticker {
                    background_image: None,
                },
                world,
            ),
            Tool::AddZone => self.place_node(NodeKind::Zone, world),
            Tool::AddShape(shape) => self.place_node(NodeKind::Generic { shape }, world),
            Tool::DrawConnection => self.connect_down(world),
            Tool::DrawFreehand => {
                self.gesture = Some(Gesture::Stroke {
                    points: vec![world],
                });
                Response::Changed
            }
        };
        blurred.max(response)
    }

    fn select_down(&mut self, world: Pos2, modifiers: Modifiers) -> Response {
        if let Some((node_id, corner, start)) = self.handle_hit(world) {
            debug!(%node_id, ?corner, "resize started");
            self.gesture = Some(Gesture::Resize {
                node_id,
                corner,
                anchor: corner.opposite().point(start),
                start,
            });
            return Response::Changed;
        }

        let tol = self.world_px(self.settings.hit_tolerance);
        if let Some(id) = geometry::topmost_non_zone_at(&self.scene, world, tol).map(|n| n.id.clone()) {
            return self.press_node(id, world, modifiers);
        }

        let hit_width = self.world_px(self.settings.connection_hit_width);
        if let Some(id) = geometry::connection_at(&self.scene, world, hit_width).map(|c| c.id.clone()) {
            self.selection = Selection::Connection(id);
            return Response::Changed;
        }

        if let Some(id) = geometry::zone_grip_at(&self.scene, world, tol).map(|n| n.id.clone()) {
            return self.press_node(id, world, modifiers);
        }

        let base = if modifiers.shift {
            self.selection.node_ids()
        } else {
            self.selection = Selection::None;
            HashSet::new()
        };
        self.gesture = Some(if self.settings.lasso_selection {
            Gesture::Lasso {
                points: vec![world],
                base,
            }
        } else {
            Gesture::SelectBox {
                start: world,
                current: world,
                base,
            }
        });
        Response::Changed
    }

    /// Click on a node: select its group (or toggle with shift) and arm a
    /// drag of every selected unlocked node.
    fn press_node(&mut self, id: String, world: Pos2, modifiers: Modifiers) -> Response {
        let group = self.scene.expand_to_groups(&HashSet::from([id.clone()]));
        let movable = !self.scene.drag_origins(&HashSet::from([id.clone()])).is_empty();

        if modifiers.shift {
            let mut ids = self.selection.node_ids();
            if ids.contains(&id) {
                ids.retain(|n| !group.contains(n));
                self.selection = Selection::from_nodes(ids);
                return Response::Changed;
            }
            ids.extend(group);
            self.selection = Selection::from_nodes(ids);
        } else if !movable || !self.selection.contains_node(&id) {
            self.selection = Selection::from_nodes(group);
        }

        if movable {
            let selected = self.scene.expand_to_groups(&self.selection.node_ids());
            let origins = self.scene.drag_origins(&selected);
            self.gesture = Some(Gesture::DragNodes {
                start: world,
                origins,
                clicked: id,
                moved: false,
                additive: modifiers.shift,
            });
        }
        Response::Changed
    }

    fn displaced(&self, origins: &[(String, Pos2)]) -> bool {
        origins
            .iter()
            .any(|(id, origin)| self.scene.node(id).is_some_and(|n| n.center() != *origin))
    }

    fn place_node(&mut self, kind: NodeKind, world: Pos2) -> Response {
        let is_text = matches!(kind, NodeKind::Text);
        let id = self.add_node(kind, world);
        self.tool = Tool::Select;
        if is_text {
            self.begin_text_edit(&id);
        }
        Response::Committed
    }

    fn connect_down(&mut self, world: Pos2) -> Response {
        let tol = self.world_px(self.settings.hit_tolerance);
        match geometry::topmost_node_at(&self.scene, world, tol) {
            Some(node) => {
                debug!(from = %node.id, "connection started");
                self.gesture = Some(Gesture::Connect {
                    from: node.id.clone(),
                    current: world,
                });
                Response::Changed
            }
            None => Response::Ignored,
        }
    }

    pub(super) fn pointer_move(&mut self, screen: Pos2) -> Response {
        let world = self.view.screen_to_world(screen);
        self.hover = Some(world);
        let threshold = self.world_px(self.settings.drag_threshold);
        let min_size = self.settings.min_node_size;
        let Some(gesture) = self.gesture.as_mut() else {
            return Response::Ignored;
        };
        match gesture {
            Gesture::Pan { last } => {
                self.view.pan += screen - *last;
                *last = screen;
            }
            Gesture::DragNodes {
                start,
                origins,
                moved,
                ..
            } => {
                let delta = world - *start;
                if !*moved && delta.length() <= threshold {
                    return Response::Ignored;
                }
                *moved = true;
                self.scene.translate_nodes(origins, delta);
            }
            Gesture::Resize {
                node_id,
                corner,
                anchor,
                ..
            } => {
                let sign = corner.sign();
                let size = egui::vec2(
                    ((world.x - anchor.x) * sign.x).max(min_size),
                    ((world.y - anchor.y) * sign.y).max(min_size),
                );
                let center = *anchor + egui::vec2(sign.x * size.x, sign.y * size.y) * 0.5;
                self.scene.update_node(node_id, |n| {
                    n.width = Some(size.x);
                    n.height = Some(size.y);
                    n.set_center(center);
                });
            }
            Gesture::SelectBox { current, .. } => *current = world,
            Gesture::Connect { current, .. } => *current = world,
            Gesture::Lasso { points, .. } | Gesture::Stroke { points } => {
                if points.last() != Some(&world) {
                    points.push(world);
                }
            }
        }
        Response::Changed
    }

    pub(super) fn pointer_up(&mut self, screen: Pos2) -> Response {
        let world = self.view.screen_to_world(screen);
        let Some(gesture) = self.gesture.take() else {
            return Response::Ignored;
        };
        match gesture {
            Gesture::Pan { .. } => Response::Changed,
            Gesture::DragNodes {
                moved: true,
                origins,
                ..
            } if self.displaced(&origins) => {
                debug!(count = origins.len(), "nodes moved");
                self.commit("move nodes");
                Response::Committed
            }
            Gesture::DragNodes {
                clicked,
                additive: false,
                ..
            } => {
                // A plain click inside a multi-selection narrows it.
                let group = self.scene.expand_to_groups(&HashSet::from([clicked]));
                self.selection = Selection::from_nodes(group);
                Response::Changed
            }
            Gesture::DragNodes { .. } => Response::Ignored,
            Gesture::Resize { node_id, start, .. } => {
                let resized = self
                    .scene
                    .node(&node_id)
                    .is_some_and(|n| geometry::node_rect(n) != start);
                if resized {
                    self.commit("resize node");
                    Response::Committed
                } else {
                    Response::Changed
                }
            }
            Gesture::SelectBox {
                start,
                current,
                base,
            } => {
                let area = Rect::from_two_pos(start, current);
                self.finish_area_selection(base, geometry::nodes_in_rect(&self.scene, area))
            }
            Gesture::Lasso { points, base } => {
                self.finish_area_selection(base, geometry::nodes_in_polygon(&self.scene, &points))
            }
            Gesture::Connect { from, .. } => {
                let tol = self.world_px(self.settings.hit_tolerance);
                let target = geometry::topmost_node_at(&self.scene, world, tol).map(|n| n.id.clone());
                match target {
                    Some(to) if to != from => {
                        self.add_connection(from, to);
                        Response::Committed
                    }
                    _ => {
                        debug!("connection cancelled");
                        Response::Changed
                    }
                }
            }
            Gesture::Stroke { points } => {
                let response = if points.len() >= 2 {
                    let id = self.ids.allocate(IdKind::Path, &self.scene);
                    let points = points.into_iter().map(Point::from_pos2).collect();
                    self.scene.add_path(FreehandPath::new(id, points, &self.pen));
                    self.commit("draw path");
                    Response::Committed
                } else {
                    Response::Changed
                };
                self.tool = self.previous_tool;
                response
            }
        }
    }

    fn finish_area_selection(&mut self, base: HashSet<String>, hit: Vec<String>) -> Response {
        let mut ids = base;
        ids.extend(hit);
        let ids = self.scene.expand_to_groups(&ids);
        self.selection = Selection::from_nodes(ids);
        Response::Changed
    }

    pub(super) fn double_click(&mut self, screen: Pos2) -> Response {
        self.cancel_gesture();
        let world = self.view.screen_to_world(screen);
        let tol = self.world_px(self.settings.hit_tolerance);
        let Some(id) = geometry::topmost_node_at(&self.scene, world, tol).map(|n| n.id.clone()) else {
            return Response::Ignored;
        };
        if self.begin_text_edit(&id) {
            Response::Changed
        } else {
            Response::Ignored
        }
    }

    pub(super) fn wheel(&mut self, screen: Pos2, delta: Vec2) -> Response {
        if delta.y == 0.0 {
            return Response::Ignored;
        }
        let before = self.view.zoom;
        let factor = (1.0 + delta.y * 0.001).clamp(0.8, 1.25);
        self.zoom_by(factor, screen);
        if self.view.zoom != before {
            Response::Changed
        } else {
            Response::Ignored
        }
    }

    /// Connects two existing nodes with the current connection style.
    pub fn add_connection(&mut self, from: String, to: String) -> Option<String> {
        if from == to || self.scene.node(&from).is_none() || self.scene.node(&to).is_none() {
            return None;
        }
        let id = self.ids.allocate(IdKind::Connection, &self.scene);
        let mut connection = Connection::new(id.clone(), from, to);
        connection.style = self.connection_style.clone();
        debug!(%id, from = %connection.from, to = %connection.to, "connection added");
        self.scene.add_connection(connection);
        self.commit("add connection");
        Some(id)
    }
}
