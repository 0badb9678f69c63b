use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use futures::{select_biased, FutureExt, StreamExt};

use crate::map::{LayerId, TileEvent, TileLayer};
use crate::timer::Timer;

/// Load bookkeeping for one tiled layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleRecord {
    /// Tile requests that reported a load-start.
    pub started: u32,
    /// Tile requests that reported load-end or load-error. Errors
    /// count the same as successes for settlement.
    pub finished: u32,
    /// True when settlement came from the grace timer or from the
    /// event stream ending, rather than from matched counters.
    pub forced: bool,
}

/// Waits until `layer` has no outstanding tile activity.
///
/// The layer settles when every observed load-start has a matching
/// load-end or load-error. A source with nothing to load (e.g. fully
/// cached) never reports a start, so the grace timer force-settles it
/// after `grace` with no activity. A layer whose in-flight loads are
/// still pending when the grace fires keeps waiting on events.
pub async fn settle_layer(
    layer: &dyn TileLayer,
    timer: &dyn Timer,
    grace: Duration,
) -> (LayerId, SettleRecord) {
    let mut record = SettleRecord::default();
    let mut events = layer.events().fuse();
    let mut grace = timer.sleep(grace).fuse();

    loop {
        // Biased toward the event stream: queued activity is processed
        // before the grace timer may declare the source silent.
        select_biased! {
            event = events.next() => match event {
                Some(TileEvent::LoadStart) => record.started += 1,
                Some(TileEvent::LoadEnd) | Some(TileEvent::LoadError) => record.finished += 1,
                None => {
                    // Source detached; nothing further can arrive.
                    record.forced = record.started == 0 || record.finished < record.started;
                    break;
                }
            },
            () = grace => {
                if record.started == 0 {
                    record.forced = true;
                    break;
                }
            }
        }
        if record.started > 0 && record.finished >= record.started {
            break;
        }
    }

    (layer.id(), record)
}

/// Settles every tracked layer and reports the records keyed by layer
/// identity. Layers settle independently and in any order; this
/// resolves only once all of them have.
pub async fn settle_all(
    layers: &[Box<dyn TileLayer>],
    timer: &dyn Timer,
    grace: Duration,
) -> HashMap<LayerId, SettleRecord> {
    let pending: Vec<_> = layers
        .iter()
        .map(|layer| settle_layer(layer.as_ref(), timer, grace))
        .collect();
    join_all(pending).await.into_iter().collect()
}
