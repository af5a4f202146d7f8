// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Display-refresh signal source.

/// A source of "a frame may be drawn now" signals.
///
/// The host promises to deliver each signal once, "soon", at roughly its
/// display refresh cadence; delivery may be throttled, delayed, or batched.
/// Waiting on the next signal is the runtime's only suspension point, and
/// the host cancels the run loop simply by returning `None`.
pub trait RefreshSignal {
    /// Blocks until the next refresh signal.
    ///
    /// Returns `None` when the host has stopped requesting frames.
    fn wait(&mut self) -> Option<()>;
}

/// Channel-backed refresh source.
///
/// The host side keeps the [`flume::Sender`] and sends one unit per refresh;
/// dropping the sender ends the run loop.
pub struct ChannelSignal {
    receiver: flume::Receiver<()>,
}

impl ChannelSignal {
    /// Wraps an existing receiver.
    pub fn new(receiver: flume::Receiver<()>) -> Self {
        Self { receiver }
    }

    /// Creates a connected sender/signal pair.
    pub fn pair() -> (flume::Sender<()>, Self) {
        let (sender, receiver) = flume::unbounded();
        (sender, Self { receiver })
    }
}

impl RefreshSignal for ChannelSignal {
    fn wait(&mut self) -> Option<()> {
        self.receiver.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_arrive_in_order_then_close() {
        let (sender, mut signal) = ChannelSignal::pair();
        sender.send(()).expect("send should succeed");
        sender.send(()).expect("send should succeed");
        drop(sender);

        assert_eq!(signal.wait(), Some(()));
        assert_eq!(signal.wait(), Some(()));
        assert_eq!(signal.wait(), None, "a dropped sender ends the loop");
    }

    #[test]
    fn wait_sees_signals_sent_from_another_thread() {
        let (sender, mut signal) = ChannelSignal::pair();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            sender.send(()).expect("send from thread failed");
        });

        assert_eq!(signal.wait(), Some(()));
        handle.join().expect("thread join failed");
        assert_eq!(signal.wait(), None);
    }
}
