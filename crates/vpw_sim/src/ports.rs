//! The port registry: a name-to-accessor map built once per model type.
//!
//! A registry is declared with the [`port_registry!`](crate::port_registry)
//! macro next to the model struct. Each declared field becomes a [`Port`]
//! carrying plain function pointers that read or write the field, so the
//! same table serves `prep`, `update` and trace capture.

use std::collections::HashMap;
use std::fmt;

use vpw_common::{Direction, PortWidth, SignalValue};

use crate::error::SimError;

/// Reads a port off a model.
pub enum Reader<M> {
    /// A scalar field widened to `u64`.
    Scalar(fn(&M) -> u64),
    /// A word-array field, least significant word first.
    Words(fn(&M) -> &[u32]),
}

/// Writes a port on a model.
pub enum Writer<M> {
    /// Stores a value already truncated to the port width.
    Scalar(fn(&mut M, u64)),
    /// Borrows the backing word array for indexed writes.
    Words(fn(&mut M) -> &mut [u32]),
}

// fn pointers are Copy for every M; derive would demand M: Copy.
impl<M> Clone for Reader<M> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<M> Copy for Reader<M> {}
impl<M> Clone for Writer<M> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<M> Copy for Writer<M> {}

/// One named signal on a model.
pub struct Port<M> {
    name: &'static str,
    direction: Direction,
    width: PortWidth,
    bits: u32,
    reader: Reader<M>,
    writer: Option<Writer<M>>,
}

impl<M> Port<M> {
    /// The field name, matched exactly by `prep`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The native storage width.
    pub fn width(&self) -> PortWidth {
        self.width
    }

    /// The signal width in bits, at most the storage width.
    ///
    /// Writes still wrap at the storage width; this is the width traces
    /// declare.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns `true` if the port accepts writes.
    pub fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    /// Reads the current value off `model`.
    pub fn read(&self, model: &M) -> SignalValue {
        match self.reader {
            Reader::Scalar(get) => SignalValue::Scalar(get(model)),
            Reader::Words(get) => {
                SignalValue::Words(get(model).iter().map(|&w| w as u64).collect())
            }
        }
    }

    /// Writes `values` into the port, truncating each to the native word.
    ///
    /// Scalars consult only `values[0]`. Arrays take `values[i]` into word
    /// `i`; words past the end of `values` keep their contents. Returns the
    /// number of surplus values that did not fit, which is zero for
    /// scalars. Does nothing for read-only ports.
    pub fn write(&self, model: &mut M, values: &[u64]) -> usize {
        let Some(writer) = self.writer else {
            return 0;
        };
        match writer {
            Writer::Scalar(set) => {
                if let Some(&v) = values.first() {
                    set(model, self.width.truncate(v));
                }
                0
            }
            Writer::Words(get_mut) => {
                let words = get_mut(model);
                for (slot, &v) in words.iter_mut().zip(values) {
                    *slot = self.width.truncate(v) as u32;
                }
                values.len().saturating_sub(words.len())
            }
        }
    }

    /// Writes a scalar value, used by the clock sequencer.
    pub(crate) fn drive(&self, model: &mut M, value: u64) {
        if let Some(Writer::Scalar(set)) = self.writer {
            set(model, self.width.truncate(value));
        }
    }
}

impl<M> fmt::Debug for Port<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("width", &self.width)
            .field("bits", &self.bits)
            .finish()
    }
}

/// Every port of one model type, in declaration order.
///
/// Lookups are case-sensitive exact matches. At most one port is the
/// clock; it is driven only by the sequencer and is never written by
/// `prep` or included in a snapshot.
pub struct PortRegistry<M> {
    ports: Vec<Port<M>>,
    index: HashMap<&'static str, usize>,
    clock: Option<usize>,
}

impl<M> PortRegistry<M> {
    /// Starts an empty registry.
    pub fn builder() -> RegistryBuilder<M> {
        RegistryBuilder { ports: Vec::new() }
    }

    /// Looks up a port by exact name.
    pub fn get(&self, name: &str) -> Option<&Port<M>> {
        self.index.get(name).map(|&i| &self.ports[i])
    }

    /// Looks up a port that `prep` may write.
    pub fn writable(&self, name: &str) -> Option<&Port<M>> {
        self.get(name)
            .filter(|p| p.direction.is_writable() && p.is_writable())
    }

    /// Returns the clock port, if one is designated.
    pub fn clock(&self) -> Option<&Port<M>> {
        self.clock.map(|i| &self.ports[i])
    }

    /// Makes the named scalar port the clock.
    ///
    /// A port already declared as the clock is accepted as-is. Any other
    /// writable scalar port is re-designated, and a previously designated
    /// clock is demoted to a plain input.
    pub fn designate_clock(&mut self, name: &str) -> Result<(), SimError> {
        let unknown = || SimError::UnknownClock {
            name: name.to_string(),
        };
        let idx = *self.index.get(name).ok_or_else(unknown)?;
        let port = &self.ports[idx];
        if port.width.is_wide() || !matches!(port.writer, Some(Writer::Scalar(_))) {
            return Err(unknown());
        }
        if let Some(old) = self.clock.replace(idx) {
            if old != idx {
                self.ports[old].direction = Direction::Input;
            }
        }
        self.ports[idx].direction = Direction::Clock;
        Ok(())
    }

    /// Iterates the ports in declaration order, clock included.
    pub fn iter(&self) -> impl Iterator<Item = &Port<M>> {
        self.ports.iter()
    }

    /// Returns the port at a declaration index.
    pub(crate) fn port_at(&self, index: usize) -> &Port<M> {
        &self.ports[index]
    }

    /// Declaration indices of every port other than the clock.
    pub(crate) fn signal_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.ports.len()).filter(move |&i| Some(i) != self.clock)
    }

    /// Number of ports, clock included.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns `true` if the registry declares no ports.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl<M> fmt::Debug for PortRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortRegistry")
            .field("ports", &self.ports)
            .field("clock", &self.clock().map(Port::name))
            .finish()
    }
}

/// Collects port declarations and checks them when the registry is built.
pub struct RegistryBuilder<M> {
    ports: Vec<Port<M>>,
}

impl<M> RegistryBuilder<M> {
    /// Adds a port whose signal fills its storage. Output ports drop the
    /// writer.
    pub fn port(
        &mut self,
        name: &'static str,
        direction: Direction,
        width: PortWidth,
        reader: Reader<M>,
        writer: Writer<M>,
    ) -> &mut Self {
        let writer = (direction != Direction::Output).then_some(writer);
        self.ports.push(Port {
            name,
            direction,
            width,
            bits: width.storage_bits(),
            reader,
            writer,
        });
        self
    }

    /// Narrows the signal width of the port added last, clamped to
    /// `1..=storage bits`.
    pub fn with_bits(&mut self, bits: u32) -> &mut Self {
        if let Some(port) = self.ports.last_mut() {
            port.bits = bits.clamp(1, port.width.storage_bits());
        }
        self
    }

    /// Builds the registry, rejecting duplicate names and a second clock.
    pub fn build(self) -> Result<PortRegistry<M>, SimError> {
        let mut index = HashMap::with_capacity(self.ports.len());
        let mut clock: Option<usize> = None;
        for (i, port) in self.ports.iter().enumerate() {
            if index.insert(port.name, i).is_some() {
                return Err(SimError::DuplicatePort {
                    name: port.name.to_string(),
                });
            }
            if port.direction == Direction::Clock {
                if let Some(first) = clock {
                    return Err(SimError::MultipleClocks {
                        first: self.ports[first].name.to_string(),
                        second: port.name.to_string(),
                    });
                }
                clock = Some(i);
            }
        }
        Ok(PortRegistry {
            ports: self.ports,
            index,
            clock,
        })
    }
}

/// Types with a declared port registry.
///
/// Implemented by [`port_registry!`](crate::port_registry); implementing it
/// by hand is possible through [`PortRegistry::builder`].
pub trait Ports: Sized {
    /// Builds the registry describing this type's fields.
    fn registry() -> Result<PortRegistry<Self>, SimError>;
}

/// Declares the port registry of a model struct.
///
/// Each entry names a direction keyword (`input`, `output`, `inout` or
/// `clock`), a field, and its storage: `u8`, `u16`, `u32`, `u64` or
/// `[u32; N]` for wide ports. A `[msb:lsb]` range after the field name
/// gives the signal width when it is narrower than the storage.
///
/// ```
/// use vpw_sim::port_registry;
///
/// #[derive(Default)]
/// struct Adder {
///     clk: u8,
///     a: u32,
///     b: u32,
///     sum: u64,
/// }
///
/// port_registry!(Adder {
///     clock clk[0:0]: u8,
///     input a: u32,
///     input b: u32,
///     output sum[32:0]: u64,
/// });
///
/// use vpw_sim::Ports;
/// let registry = Adder::registry().unwrap();
/// assert_eq!(registry.len(), 4);
/// assert_eq!(registry.clock().map(|p| p.name()), Some("clk"));
/// assert_eq!(registry.get("sum").map(|p| p.bits()), Some(33));
/// ```
#[macro_export]
macro_rules! port_registry {
    ($model:ty {
        $($dir:ident $name:ident $([$msb:literal : $lsb:literal])? : $storage:tt),* $(,)?
    }) => {
        impl $crate::ports::Ports for $model {
            fn registry() -> ::std::result::Result<
                $crate::ports::PortRegistry<Self>,
                $crate::SimError,
            > {
                let mut builder = $crate::ports::PortRegistry::<$model>::builder();
                $(
                    $crate::__vpw_port!(builder, $model, $dir, $name, $storage);
                    $crate::__vpw_bits!(builder $(, $msb, $lsb)?);
                )*
                builder.build()
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vpw_port {
    ($builder:ident, $model:ty, $dir:ident, $name:ident, [u32; $words:literal]) => {{
        fn read(m: &$model) -> &[u32] {
            &m.$name[..]
        }
        fn write(m: &mut $model) -> &mut [u32] {
            &mut m.$name[..]
        }
        $builder.port(
            stringify!($name),
            $crate::__vpw_direction!($dir),
            $crate::vpw_common::PortWidth::Wide { words: $words },
            $crate::ports::Reader::Words(read),
            $crate::ports::Writer::Words(write),
        );
    }};
    ($builder:ident, $model:ty, $dir:ident, $name:ident, $storage:ident) => {{
        fn read(m: &$model) -> u64 {
            m.$name as u64
        }
        fn write(m: &mut $model, v: u64) {
            m.$name = v as $storage;
        }
        $builder.port(
            stringify!($name),
            $crate::__vpw_direction!($dir),
            $crate::__vpw_width!($storage),
            $crate::ports::Reader::Scalar(read),
            $crate::ports::Writer::Scalar(write),
        );
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vpw_bits {
    ($builder:ident) => {};
    ($builder:ident, $msb:literal, $lsb:literal) => {
        $builder.with_bits($msb - $lsb + 1);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vpw_direction {
    (input) => {
        $crate::vpw_common::Direction::Input
    };
    (output) => {
        $crate::vpw_common::Direction::Output
    };
    (inout) => {
        $crate::vpw_common::Direction::Inout
    };
    (clock) => {
        $crate::vpw_common::Direction::Clock
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vpw_width {
    (u8) => {
        $crate::vpw_common::PortWidth::U8
    };
    (u16) => {
        $crate::vpw_common::PortWidth::U16
    };
    (u32) => {
        $crate::vpw_common::PortWidth::U32
    };
    (u64) => {
        $crate::vpw_common::PortWidth::U64
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Widget {
        clk: u8,
        sel: u8,
        addr: u16,
        data: [u32; 3],
        status: u32,
        bus: u64,
    }

    crate::port_registry!(Widget {
        clock clk[0:0]: u8,
        input sel: u8,
        input addr[11:0]: u16,
        input data: [u32; 3],
        output status: u32,
        inout bus: u64,
    });

    fn registry() -> PortRegistry<Widget> {
        Widget::registry().unwrap()
    }

    #[test]
    fn declaration_order_and_clock() {
        let reg = registry();
        let names: Vec<_> = reg.iter().map(Port::name).collect();
        assert_eq!(names, ["clk", "sel", "addr", "data", "status", "bus"]);
        assert_eq!(reg.clock().map(Port::name), Some("clk"));
        assert_eq!(reg.get("data").unwrap().width(), PortWidth::Wide { words: 3 });
    }

    #[test]
    fn signal_bits_default_to_storage() {
        let reg = registry();
        let bits: Vec<_> = reg.iter().map(Port::bits).collect();
        assert_eq!(bits, [1, 8, 12, 96, 32, 64]);
    }

    #[test]
    fn narrow_signal_still_wraps_at_storage() {
        let reg = registry();
        let mut m = Widget::default();
        reg.get("addr").unwrap().write(&mut m, &[0x1_2345]);
        assert_eq!(m.addr, 0x2345);
    }

    #[test]
    fn with_bits_clamps_to_storage() {
        fn get(m: &Widget) -> u64 {
            m.sel as u64
        }
        fn set(m: &mut Widget, v: u64) {
            m.sel = v as u8;
        }
        let mut builder = PortRegistry::<Widget>::builder();
        builder
            .port("wide", Direction::Input, PortWidth::U8, Reader::Scalar(get), Writer::Scalar(set))
            .with_bits(40)
            .port("none", Direction::Input, PortWidth::U8, Reader::Scalar(get), Writer::Scalar(set))
            .with_bits(0);
        let reg = builder.build().unwrap();
        assert_eq!(reg.get("wide").unwrap().bits(), 8);
        assert_eq!(reg.get("none").unwrap().bits(), 1);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let reg = registry();
        assert!(reg.get("sel").is_some());
        assert!(reg.get("SEL").is_none());
        assert!(reg.get("se").is_none());
    }

    #[test]
    fn outputs_and_clock_are_not_writable_by_name() {
        let reg = registry();
        assert!(reg.writable("status").is_none());
        assert!(reg.writable("clk").is_none());
        assert!(reg.writable("bus").is_some());
        assert!(!reg.get("status").unwrap().is_writable());
    }

    #[test]
    fn scalar_write_truncates() {
        let reg = registry();
        let mut m = Widget::default();
        reg.get("sel").unwrap().write(&mut m, &[0x1ff]);
        reg.get("addr").unwrap().write(&mut m, &[0xdead_beef]);
        assert_eq!(m.sel, 0xff);
        assert_eq!(m.addr, 0xbeef);
        assert_eq!(reg.get("addr").unwrap().read(&m), 0xbeefu64);
    }

    #[test]
    fn scalar_write_uses_first_value_only() {
        let reg = registry();
        let mut m = Widget::default();
        let surplus = reg.get("bus").unwrap().write(&mut m, &[5, 6, 7]);
        assert_eq!(m.bus, 5);
        assert_eq!(surplus, 0);
    }

    #[test]
    fn array_write_in_word_order() {
        let reg = registry();
        let mut m = Widget::default();
        let port = reg.get("data").unwrap();
        assert_eq!(port.write(&mut m, &[1, 2, 3]), 0);
        assert_eq!(m.data, [1, 2, 3]);
        assert_eq!(port.read(&m), [1u64, 2, 3]);
    }

    #[test]
    fn array_short_write_keeps_tail() {
        let reg = registry();
        let mut m = Widget {
            data: [9, 9, 9],
            ..Widget::default()
        };
        reg.get("data").unwrap().write(&mut m, &[0x1_0000_0004]);
        assert_eq!(m.data, [4, 9, 9]);
    }

    #[test]
    fn array_surplus_is_reported() {
        let reg = registry();
        let mut m = Widget::default();
        let surplus = reg.get("data").unwrap().write(&mut m, &[1, 2, 3, 4, 5]);
        assert_eq!(surplus, 2);
        assert_eq!(m.data, [1, 2, 3]);
    }

    #[test]
    fn output_write_is_ignored() {
        let reg = registry();
        let mut m = Widget::default();
        reg.get("status").unwrap().write(&mut m, &[42]);
        assert_eq!(m.status, 0);
    }

    #[test]
    fn designate_clock_moves_the_clock() {
        let mut reg = registry();
        reg.designate_clock("sel").unwrap();
        assert_eq!(reg.clock().map(Port::name), Some("sel"));
        assert_eq!(reg.get("clk").unwrap().direction(), Direction::Input);
        assert!(reg.writable("clk").is_some());
        assert!(reg.writable("sel").is_none());
    }

    #[test]
    fn designate_clock_rejects_unknown_and_wide() {
        let mut reg = registry();
        assert!(matches!(
            reg.designate_clock("nope"),
            Err(SimError::UnknownClock { .. })
        ));
        assert!(reg.designate_clock("data").is_err());
        assert!(reg.designate_clock("status").is_err());
    }

    #[test]
    fn signal_indices_skip_clock() {
        let reg = registry();
        let names: Vec<_> = reg.signal_indices().map(|i| reg.port_at(i).name()).collect();
        assert_eq!(names, ["sel", "addr", "data", "status", "bus"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        fn get(m: &Widget) -> u64 {
            m.sel as u64
        }
        fn set(m: &mut Widget, v: u64) {
            m.sel = v as u8;
        }
        let mut b = PortRegistry::<Widget>::builder();
        b.port("sel", Direction::Input, PortWidth::U8, Reader::Scalar(get), Writer::Scalar(set));
        b.port("sel", Direction::Input, PortWidth::U8, Reader::Scalar(get), Writer::Scalar(set));
        assert!(matches!(b.build(), Err(SimError::DuplicatePort { .. })));
    }

    #[test]
    fn two_clocks_rejected() {
        fn get(m: &Widget) -> u64 {
            m.clk as u64
        }
        fn set(m: &mut Widget, v: u64) {
            m.clk = v as u8;
        }
        let mut b = PortRegistry::<Widget>::builder();
        b.port("clk", Direction::Clock, PortWidth::U8, Reader::Scalar(get), Writer::Scalar(set));
        b.port("clk2", Direction::Clock, PortWidth::U8, Reader::Scalar(get), Writer::Scalar(set));
        assert!(matches!(b.build(), Err(SimError::MultipleClocks { .. })));
    }
}
