use super::{Record, Recorder};
use crossbeam_channel::{unbounded, Sender};
use log::{trace, warn};
use std::thread::{self, JoinHandle};

/// Writes records on a worker thread.
///
/// [`Recorder::write`] only sends the record over an unbounded channel, so a
/// slow destination, like a remote tracking server or a large GIF, does not
/// stall the caller. Records are written in the order they were sent.
///
/// [`AsyncRecorder::close`] waits for pending records and returns the wrapped
/// recorder. Dropping the recorder also waits for pending records.
pub struct AsyncRecorder<R>
where
    R: Recorder + Send + 'static,
{
    sender: Option<Sender<Record>>,
    handle: Option<JoinHandle<R>>,
}

impl<R> AsyncRecorder<R>
where
    R: Recorder + Send + 'static,
{
    /// Spawns the worker thread owning `recorder`.
    pub fn new(mut recorder: R) -> Self {
        let (sender, receiver) = unbounded::<Record>();
        let handle = thread::spawn(move || {
            for record in receiver.iter() {
                recorder.write(record);
            }
            trace!("AsyncRecorder worker finished");
            recorder
        });

        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Waits until all pending records are written and returns the wrapped recorder.
    ///
    /// Returns `None` if the recorder was already closed or the worker panicked.
    pub fn close(&mut self) -> Option<R> {
        // Disconnecting the channel ends the loop of the worker
        self.sender = None;

        match self.handle.take()?.join() {
            Ok(recorder) => Some(recorder),
            Err(_) => {
                warn!("AsyncRecorder worker panicked, pending records were lost");
                None
            }
        }
    }
}

impl<R> Recorder for AsyncRecorder<R>
where
    R: Recorder + Send + 'static,
{
    fn write(&mut self, record: Record) {
        match self.sender.as_ref() {
            Some(sender) => {
                if sender.send(record).is_err() {
                    warn!("AsyncRecorder worker is not running, record discarded");
                }
            }
            None => warn!("AsyncRecorder is closed, record discarded"),
        }
    }
}

impl<R> Drop for AsyncRecorder<R>
where
    R: Recorder + Send + 'static,
{
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BufferedRecorder;

    #[test]
    fn test_records_reach_inner_recorder() {
        let mut recorder = AsyncRecorder::new(BufferedRecorder::new());
        for i in 0..5 {
            recorder.write(Record::from_scalar("episode", i as f32));
        }

        let inner = recorder.close().unwrap();
        let episodes: Vec<f32> = inner
            .iter()
            .map(|r| r.get_scalar("episode").unwrap())
            .collect();

        assert_eq!(episodes, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(recorder.close().is_none());

        // Writing after close is discarded without panicking
        recorder.write(Record::from_scalar("episode", 5.0));
    }
}
