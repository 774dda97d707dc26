//! Waveform trace recording.
//!
//! The [`TraceRecorder`] trait is the harness's view of a waveform writer:
//! variables are declared once, then one frame of values is dumped per
//! evaluation step. [`VcdRecorder`] implements the IEEE 1364 Value Change
//! Dump format, readable by GTKWave, Surfer and other viewers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use vpw_common::{SignalValue, Timescale};

use crate::error::SimError;
use crate::ports::PortRegistry;

/// A traced variable: a port name and its width in bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceVar {
    /// The variable name inside the scope.
    pub name: String,
    /// Width in bits.
    pub width: u32,
}

/// Trait for waveform writers driven by the clock sequencer.
///
/// Frames passed to [`dump`](TraceRecorder::dump) hold one value per
/// declared variable, in declaration order, at strictly increasing times.
pub trait TraceRecorder {
    /// Declares the variables of one scope. Must precede the first dump.
    fn declare(&mut self, scope: &str, vars: &[TraceVar]) -> Result<(), SimError>;

    /// Records the values of every declared variable at `time`.
    fn dump(&mut self, time: u64, frame: &[SignalValue]) -> Result<(), SimError>;

    /// Pushes buffered output to the underlying sink.
    fn flush(&mut self) -> Result<(), SimError>;

    /// Flushes and closes the recorder. Later calls fail with `TraceClosed`.
    fn close(&mut self) -> Result<(), SimError>;
}

/// VCD (Value Change Dump) recorder following IEEE 1364.
///
/// Every dump writes a `#time` line; value lines are written only for
/// variables whose value changed since the previous frame. The first frame
/// is written in full inside `$dumpvars`.
pub struct VcdRecorder<W: Write> {
    writer: W,
    timescale: Timescale,
    vars: Vec<(String, u32)>, // (id_code, width)
    last: Vec<Option<SignalValue>>,
    header_written: bool,
    current_time: Option<u64>,
    closed: bool,
}

impl VcdRecorder<BufWriter<File>> {
    /// Creates (or truncates) a VCD file at `path`.
    pub fn create(path: &Path) -> Result<Self, SimError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a new VCD recorder writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            timescale: Timescale::default(),
            vars: Vec::new(),
            last: Vec::new(),
            header_written: false,
            current_time: None,
            closed: false,
        }
    }

    /// Sets the `$timescale` written in the header.
    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    /// Consumes the recorder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> Result<(), SimError> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.writer, "$date")?;
        writeln!(self.writer, "  Simulation date")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  vpw harness")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  {}", self.timescale)?;
        writeln!(self.writer, "$end")?;
        self.header_written = true;
        Ok(())
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Uses printable ASCII characters starting from `!` (0x21).
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    /// Formats a value as a VCD binary string of `width` bits.
    fn format_value(value: &SignalValue, width: u32) -> String {
        let bit = |i: u32| -> bool {
            match value {
                SignalValue::Scalar(v) => i < 64 && (v >> i) & 1 == 1,
                SignalValue::Words(words) => words
                    .get((i / 32) as usize)
                    .is_some_and(|w| (w >> (i % 32)) & 1 == 1),
            }
        };
        if width == 1 {
            return if bit(0) { "1" } else { "0" }.into();
        }
        let mut s = String::with_capacity(width as usize + 1);
        s.push('b');
        for i in (0..width).rev() {
            s.push(if bit(i) { '1' } else { '0' });
        }
        s
    }

    fn write_value(&mut self, index: usize, value: &SignalValue) -> Result<(), SimError> {
        let (id_code, width) = &self.vars[index];
        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")?;
        } else {
            writeln!(self.writer, "{val_str} {id_code}")?;
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), SimError> {
        if self.closed {
            Err(SimError::TraceClosed)
        } else {
            Ok(())
        }
    }
}

impl<W: Write> TraceRecorder for VcdRecorder<W> {
    fn declare(&mut self, scope: &str, vars: &[TraceVar]) -> Result<(), SimError> {
        self.ensure_open()?;
        if self.current_time.is_some() {
            return Err(SimError::DeclarationAfterDump);
        }
        self.write_header()?;
        writeln!(self.writer, "$scope module {scope} $end")?;
        for var in vars {
            let id_code = Self::make_id_code(self.vars.len() as u32);
            writeln!(self.writer, "$var wire {} {id_code} {} $end", var.width, var.name)?;
            self.vars.push((id_code, var.width));
            self.last.push(None);
        }
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn dump(&mut self, time: u64, frame: &[SignalValue]) -> Result<(), SimError> {
        self.ensure_open()?;
        if frame.len() != self.vars.len() {
            return Err(SimError::FrameMismatch {
                expected: self.vars.len(),
                actual: frame.len(),
            });
        }
        match self.current_time {
            Some(previous) if time <= previous => {
                return Err(SimError::NonMonotonicTrace { previous, time });
            }
            Some(_) => {
                writeln!(self.writer, "#{time}")?;
                for (i, value) in frame.iter().enumerate() {
                    if self.last[i].as_ref() != Some(value) {
                        self.write_value(i, value)?;
                        self.last[i] = Some(value.clone());
                    }
                }
            }
            None => {
                self.write_header()?;
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "#{time}")?;
                writeln!(self.writer, "$dumpvars")?;
                for (i, value) in frame.iter().enumerate() {
                    self.write_value(i, value)?;
                    self.last[i] = Some(value.clone());
                }
                writeln!(self.writer, "$end")?;
            }
        }
        self.current_time = Some(time);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        self.ensure_open()?;
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        self.ensure_open()?;
        if self.current_time.is_none() {
            // No frames recorded, still terminate the definitions
            self.write_header()?;
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Connects a model's ports to a recorder for the sequencer's dumps.
pub(crate) struct TraceBinding {
    recorder: Box<dyn TraceRecorder>,
    ports: Vec<usize>,
}

impl TraceBinding {
    /// Declares the traced ports of `registry` in `scope`.
    ///
    /// Ports sit one level below the top scope, so a depth of 0 declares
    /// nothing and frames are empty.
    pub(crate) fn bind<M>(
        mut recorder: Box<dyn TraceRecorder>,
        registry: &PortRegistry<M>,
        scope: &str,
        depth: u32,
    ) -> Result<Self, SimError> {
        let ports: Vec<usize> = if depth == 0 {
            Vec::new()
        } else {
            (0..registry.len()).collect()
        };
        let vars: Vec<TraceVar> = ports
            .iter()
            .map(|&i| {
                let port = registry.port_at(i);
                TraceVar {
                    name: port.name().to_string(),
                    width: port.bits(),
                }
            })
            .collect();
        recorder.declare(scope, &vars)?;
        Ok(Self { recorder, ports })
    }

    /// Dumps the current value of every traced port at `time`.
    pub(crate) fn dump<M>(
        &mut self,
        time: u64,
        registry: &PortRegistry<M>,
        model: &M,
    ) -> Result<(), SimError> {
        let frame: Vec<SignalValue> = self
            .ports
            .iter()
            .map(|&i| registry.port_at(i).read(model))
            .collect();
        tracing::trace!(time, values = frame.len(), "trace dump");
        self.recorder.dump(time, &frame)
    }

    pub(crate) fn flush(&mut self) -> Result<(), SimError> {
        self.recorder.flush()
    }

    pub(crate) fn close(&mut self) -> Result<(), SimError> {
        self.recorder.close()
    }
}
