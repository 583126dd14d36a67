use crate::position::{AdjustedPosition, Position};
use egui::{PointerButton, Response, Vec2};

/// Time constant of inertia stopping filter.
const INERTIA_TAU: f32 = 0.2f32;

/// Position of the map's center, together with any movement it is undergoing.
///
/// `Moving` exists only between pointer-down and pointer-up; it snapshots the position the drag
/// started from and the most recent pointer delta. Nothing outside the widget's input pass may
/// observe or alter it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Center {
    /// Map is at rest at the exact position.
    Exact(AdjustedPosition),

    /// Map is being dragged by mouse or finger.
    Moving {
        position: AdjustedPosition,
        direction: Vec2,
    },

    /// Map is moving, but due to inertia, and will slow down and stop in a short while.
    Inertia {
        position: AdjustedPosition,
        direction: Vec2,
        amount: f32,
    },
}

impl Center {
    pub(crate) fn new(position: Position) -> Self {
        Center::Exact(AdjustedPosition::new(position))
    }

    pub(crate) fn handle_gestures(&mut self, response: &Response) -> bool {
        if response.dragged_by(PointerButton::Primary) {
            *self = Center::Moving {
                position: self.adjusted_position(),
                direction: response.drag_delta(),
            };
            true
        } else if response.drag_stopped() {
            self.drag_stopped();
            true
        } else {
            false
        }
    }

    fn drag_stopped(&mut self) {
        if let Center::Moving {
            position,
            direction,
        } = &self
        {
            *self = Center::Inertia {
                position: position.clone(),
                direction: direction.normalized(),
                amount: direction.length(),
            };
        }
    }

    /// Advance any ongoing movement. Returns whether the map moved, in which case another frame
    /// must be scheduled.
    pub(crate) fn update_movement(&mut self, delta_time: f32, zoom: f64) -> bool {
        match &self {
            Center::Moving {
                position,
                direction,
            } => {
                *self = Center::Moving {
                    position: position.clone().shift(*direction, zoom),
                    direction: *direction,
                };
                true
            }
            Center::Inertia {
                position,
                direction,
                amount,
            } => {
                *self = if *amount < 0.1 {
                    Center::Exact(position.to_owned())
                } else {
                    // Exponentially drive the `amount` value towards zero.
                    let lp_factor = INERTIA_TAU / (delta_time + INERTIA_TAU);

                    Center::Inertia {
                        position: position.clone().shift(*direction * *amount, zoom),
                        direction: *direction,
                        amount: *amount * lp_factor,
                    }
                };
                true
            }
            Center::Exact(_) => false,
        }
    }

    pub(crate) fn animating(&self) -> bool {
        matches!(self, Center::Inertia { .. })
    }

    fn adjusted_position(&self) -> AdjustedPosition {
        match self {
            Center::Exact(position)
            | Center::Moving { position, .. }
            | Center::Inertia { position, .. } => position.to_owned(),
        }
    }

    /// The real position at the map's center.
    pub(crate) fn position(&self) -> Position {
        self.adjusted_position().position()
    }

    /// Shift position by given number of pixels.
    pub(crate) fn shift(self, offset: Vec2, zoom: f64) -> Self {
        match self {
            Center::Exact(position) => Center::Exact(position.shift(offset, zoom)),
            Center::Moving {
                position,
                direction,
            } => Center::Moving {
                position: position.shift(offset, zoom),
                direction,
            },
            Center::Inertia {
                position,
                direction,
                amount,
            } => Center::Inertia {
                position: position.shift(offset, zoom),
                direction,
                amount,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::lat_lon;

    #[test]
    fn drag_by_zero_pixels_leaves_center_unchanged() {
        let start = lat_lon(40.7128, -74.0060);
        let mut center = Center::Moving {
            position: AdjustedPosition::new(start),
            direction: Vec2::ZERO,
        };

        for _ in 0..10 {
            center.update_movement(1. / 60., 13.);
        }

        approx::assert_abs_diff_eq!(center.position().x(), start.x(), epsilon = 1e-9);
        approx::assert_abs_diff_eq!(center.position().y(), start.y(), epsilon = 1e-9);
    }

    #[test]
    fn dragging_moves_the_center() {
        let start = lat_lon(40.7128, -74.0060);
        let mut center = Center::Moving {
            position: AdjustedPosition::new(start),
            direction: Vec2::new(15., 0.),
        };

        assert!(center.update_movement(1. / 60., 13.));
        assert!(center.position().x() < start.x(), "map under the pointer moves east");
        approx::assert_abs_diff_eq!(center.position().y(), start.y(), epsilon = 1e-9);
    }

    #[test]
    fn inertia_comes_to_rest() {
        let mut center = Center::Inertia {
            position: AdjustedPosition::new(lat_lon(52.2297, 21.0122)),
            direction: Vec2::new(1., 0.),
            amount: 10.,
        };

        // A couple of seconds worth of frames is plenty for the filter to drain.
        for _ in 0..300 {
            center.update_movement(1. / 60., 13.);
        }

        assert!(matches!(center, Center::Exact(_)));
        assert!(!center.animating());
    }
}
