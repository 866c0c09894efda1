//! `ctrlk-channel` – typed data channels and the ports bound to them.
//!
//! A kernel owns one [`ChannelTable`]. Producers create a [`DataChannel`] in
//! it under a `(name, type)` key; consumers look the same cell up and hold it
//! through a [`ReadPort`], the producer through a [`WritePort`]. All lookups
//! happen while ports are created, so the control cycle only ever touches an
//! already-resolved cell.
//!
//! # Modules
//!
//! - [`channel`] – [`DataChannel`], [`ChannelId`] and the [`ChannelTable`].
//! - [`port`] – [`ReadPort`] and [`WritePort`].

pub mod channel;
pub mod port;

pub use channel::{ChannelData, ChannelId, ChannelInfo, ChannelTable, DataChannel};
pub use port::{ReadPort, WritePort};
