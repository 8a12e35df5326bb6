use super::Record;

/// Writes a record to an output destination with [`Recorder::write`].
///
/// Writing is best-effort: implementations report failures with the `log`
/// facade and never return them to the caller.
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);
}

/// Stores records and writes values aggregated from them.
pub trait AggregateRecorder {
    /// Store the record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is attached to the aggregated values, e.g., the episode index.
    fn flush(&mut self, step: i64);
}

impl<T: Recorder + ?Sized> Recorder for Box<T> {
    fn write(&mut self, record: Record) {
        (**self).write(record)
    }
}

impl<T: AggregateRecorder + ?Sized> AggregateRecorder for Box<T> {
    fn store(&mut self, record: Record) {
        (**self).store(record)
    }

    fn flush(&mut self, step: i64) {
        (**self).flush(step)
    }
}
