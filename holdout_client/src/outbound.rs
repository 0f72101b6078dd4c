// Outbound command encoder: local intents -> protocol messages.
//
// Input-producing collaborators call these builders; the composition
// root pushes the results through the connection. Everything here is
// pure message construction except the position reporter, which owns
// the send-throttle state.
//
// Throttle policy: positions are quantized to three decimals (the wire
// resolution), and a report goes out when the quantized value differs
// from the last one sent — the quantization grid is the movement
// epsilon. While stationary, a heartbeat re-send fires after one second
// of accumulated tick time so the server's view never goes stale. Time
// is passed in as per-tick deltas; no wall clock.

use holdout_protocol::message::ClientMessage;
use holdout_protocol::types::{AmmoType, ObjectId, Position, SessionId};

/// Heartbeat interval for stationary position re-sends, in seconds.
pub const HEARTBEAT_SECONDS: f32 = 1.0;

/// Send-throttle state for local position reports.
#[derive(Default)]
pub struct PositionReporter {
    last_sent: Option<Position>,
    still_time: f32,
}

impl PositionReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether this tick's position warrants a send. Returns the
    /// quantized position to transmit, or `None` to stay quiet.
    pub fn report(&mut self, position: Position, dt: f32) -> Option<Position> {
        let quantized = position.quantized();
        match self.last_sent {
            Some(last) if last == quantized => {
                self.still_time += dt;
                if self.still_time >= HEARTBEAT_SECONDS {
                    self.still_time = 0.0;
                    Some(quantized)
                } else {
                    None
                }
            }
            _ => {
                self.last_sent = Some(quantized);
                self.still_time = 0.0;
                Some(quantized)
            }
        }
    }

    /// Forget the last sent value (connection teardown).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Builds outbound messages from local intents.
#[derive(Default)]
pub struct OutboundEncoder {
    position: PositionReporter,
}

impl OutboundEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Movement input axes, each in [-1, 1].
    pub fn move_input(&self, horizontal: f32, vertical: f32) -> ClientMessage {
        ClientMessage::MoveInput {
            horizontal,
            vertical,
        }
    }

    /// Aim direction; normalized before transmission.
    pub fn aim(&self, direction: Position) -> ClientMessage {
        ClientMessage::Aim {
            direction: direction.normalized(),
        }
    }

    /// Throttled local position report. `None` when the throttle holds
    /// the value back.
    pub fn update_position(&mut self, position: Position, dt: f32) -> Option<ClientMessage> {
        self.position
            .report(position, dt)
            .map(|position| ClientMessage::UpdatePosition { position })
    }

    /// Fire intent from a muzzle position along a direction.
    pub fn shoot_request(&self, position: Position, direction: Position) -> ClientMessage {
        ClientMessage::ShootRequest {
            position: position.quantized(),
            direction: direction.normalized(),
        }
    }

    pub fn reload_request(&self) -> ClientMessage {
        ClientMessage::ReloadRequest
    }

    pub fn inventory_switch(&self, slot_index: usize) -> ClientMessage {
        ClientMessage::InventorySwitch { slot_index }
    }

    pub fn use_item(&self, slot_index: usize) -> ClientMessage {
        ClientMessage::UseItem { slot_index }
    }

    pub fn throw_grenade(&self, position: Position, direction: Position) -> ClientMessage {
        ClientMessage::ThrowGrenade {
            position: position.quantized(),
            direction: direction.normalized(),
        }
    }

    pub fn melee_attack(&self, target_id: SessionId, damage: f32) -> ClientMessage {
        ClientMessage::MeleeAttack { target_id, damage }
    }

    pub fn ammo_pickup(
        &self,
        pickup_id: ObjectId,
        ammo_type: AmmoType,
        amount: i32,
    ) -> ClientMessage {
        ClientMessage::AmmoPickup {
            pickup_id,
            ammo_type,
            amount,
        }
    }

    pub fn bullet_collide(&self, id: ObjectId) -> ClientMessage {
        ClientMessage::BulletCollide { id }
    }

    /// Forget throttle state (connection teardown).
    pub fn reset(&mut self) {
        self.position.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_position_always_sends() {
        let mut reporter = PositionReporter::new();
        let sent = reporter.report(Position::new(1.0, 2.0), 0.016);
        assert_eq!(sent, Some(Position::new(1.0, 2.0)));
    }

    #[test]
    fn movement_beyond_grid_sends_immediately() {
        let mut reporter = PositionReporter::new();
        reporter.report(Position::new(1.0, 2.0), 0.016);
        let sent = reporter.report(Position::new(1.002, 2.0), 0.016);
        assert_eq!(sent, Some(Position::new(1.002, 2.0)));
    }

    #[test]
    fn sub_grid_jitter_is_suppressed() {
        let mut reporter = PositionReporter::new();
        reporter.report(Position::new(1.0, 2.0), 0.016);
        // 0.0004 rounds back onto the same grid point.
        assert_eq!(reporter.report(Position::new(1.0004, 2.0), 0.016), None);
    }

    #[test]
    fn heartbeat_fires_after_a_second_of_stillness() {
        let mut reporter = PositionReporter::new();
        let pos = Position::new(3.0, 4.0);
        reporter.report(pos, 0.016);

        let mut sends = 0;
        // 75 ticks at 16 ms ≈ 1.2 s of stillness: exactly one heartbeat.
        for _ in 0..75 {
            if reporter.report(pos, 0.016).is_some() {
                sends += 1;
            }
        }
        assert_eq!(sends, 1);
    }

    #[test]
    fn movement_resets_the_heartbeat_timer() {
        let mut reporter = PositionReporter::new();
        reporter.report(Position::new(0.0, 0.0), 0.016);
        for _ in 0..30 {
            reporter.report(Position::new(0.0, 0.0), 0.016);
        }
        // Move: immediate send and a fresh still-timer.
        assert!(reporter.report(Position::new(5.0, 0.0), 0.016).is_some());
        assert_eq!(reporter.report(Position::new(5.0, 0.0), 0.5), None);
    }

    #[test]
    fn reported_positions_are_quantized() {
        let mut encoder = OutboundEncoder::new();
        let msg = encoder
            .update_position(Position::new(1.23456, -9.87654), 0.016)
            .unwrap();
        assert_eq!(
            msg,
            ClientMessage::UpdatePosition {
                position: Position::new(1.235, -9.877),
            }
        );
    }

    #[test]
    fn aim_and_shoot_normalize_direction() {
        let encoder = OutboundEncoder::new();
        match encoder.aim(Position::new(3.0, 4.0)) {
            ClientMessage::Aim { direction } => {
                assert!((direction.x - 0.6).abs() < 1e-5);
                assert!((direction.y - 0.8).abs() < 1e-5);
            }
            other => panic!("expected Aim, got {other:?}"),
        }
        match encoder.shoot_request(Position::new(0.12345, 0.0), Position::new(0.0, 2.0)) {
            ClientMessage::ShootRequest {
                position,
                direction,
            } => {
                assert_eq!(position, Position::new(0.123, 0.0));
                assert_eq!(direction, Position::new(0.0, 1.0));
            }
            other => panic!("expected ShootRequest, got {other:?}"),
        }
    }
}
