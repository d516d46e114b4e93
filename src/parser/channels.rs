//! Channel numbering.
//!
//! Channels are handed out in document order from a running counter. An
//! explicit `channel` attribute moves the counter; switch options copy their
//! switch's channel; regulators advance the counter by their footprint.

use serde::{Deserialize, Serialize};

use crate::error::{DmxError, Result};
use crate::types::MAX_CHANNEL;

/// What to do when a regulator's channel range runs past channel 512.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Reject the document.
    #[default]
    Error,
    /// Accept it; the frame silently drops channels past the end.
    Allow,
}

/// A channel request for one accepted node.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRequest {
    /// Value of the node's `channel` attribute, `None` for auto.
    pub explicit: Option<u16>,
    /// The enclosing node's resolved channel, for kinds that inherit it.
    pub inherited: Option<u16>,
    pub footprint: u16,
    pub consumes: bool,
}

/// Running channel counter for one compilation.
#[derive(Debug)]
pub struct ChannelAllocator {
    next: u32,
    policy: OverflowPolicy,
}

impl ChannelAllocator {
    pub fn new(policy: OverflowPolicy) -> Self {
        Self { next: 1, policy }
    }

    /// The channel the next auto-numbered regulator would receive.
    pub fn next_channel(&self) -> u32 {
        self.next
    }

    /// Resolve a node's channel and advance the counter.
    pub fn assign(&mut self, request: ChannelRequest) -> Result<u16> {
        let channel = match (request.explicit, request.inherited) {
            (Some(explicit), _) if request.inherited.is_none() => {
                self.next = explicit as u32;
                explicit as u32
            }
            (Some(explicit), Some(inherited)) => {
                if explicit != inherited {
                    return Err(DmxError::value(format!(
                        "channel {} differs from the enclosing switch channel {}",
                        explicit, inherited
                    ))
                    .with_help("Options always use their switch's channels; drop the attribute"));
                }
                explicit as u32
            }
            (None, Some(inherited)) => inherited as u32,
            _ => self.next,
        };

        // Containers and options hold no channels, so only regulators can run out
        if request.consumes && channel > MAX_CHANNEL as u32 {
            return Err(DmxError::value(format!(
                "no channels left: channel {} is beyond the end of the universe",
                channel
            ))
            .with_help(format!("A universe has {} channels", MAX_CHANNEL)));
        }

        if request.consumes {
            let last = channel + request.footprint as u32 - 1;
            if last > MAX_CHANNEL as u32 && self.policy == OverflowPolicy::Error {
                return Err(DmxError::value(format!(
                    "channels {}..{} run past channel {}",
                    channel, last, MAX_CHANNEL
                ))
                .with_help("Move the control to a lower channel or reduce nchannels"));
            }
            self.next += request.footprint as u32;
        }

        tracing::trace!(channel, next = self.next, "channel assigned");
        Ok(channel as u16)
    }
}
