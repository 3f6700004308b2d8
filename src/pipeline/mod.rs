pub mod bits;
pub mod cipher;
pub mod schedule;

pub use bits::{pack, slots_for, unpack};
pub use schedule::{password_seed, PositionSchedule, SlotAddress};
