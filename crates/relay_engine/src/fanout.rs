use std::num::NonZeroUsize;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use relay_core::{AggregateBatch, ReportType};
use relay_logging::{relay_debug, relay_info};

use crate::Evaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanOutSettings {
    /// Report level used for every URL in a batch.
    pub report_type: ReportType,
    /// `None` launches every evaluation at once. Large working sets will open
    /// that many outbound connections simultaneously.
    pub max_concurrency: Option<NonZeroUsize>,
}

/// Evaluates a list of URLs concurrently and joins on all of them.
///
/// One URL failing never aborts the others, and the batch keeps input order
/// regardless of completion order.
pub struct FanOutEvaluator {
    evaluator: Arc<dyn Evaluator>,
    settings: FanOutSettings,
}

impl FanOutEvaluator {
    pub fn new(evaluator: Arc<dyn Evaluator>, settings: FanOutSettings) -> Self {
        Self {
            evaluator,
            settings,
        }
    }

    pub fn settings(&self) -> FanOutSettings {
        self.settings
    }

    pub async fn run(&self, urls: &[String]) -> AggregateBatch {
        let report_type = self.settings.report_type;
        relay_debug!(
            "Fan-out of {} urls (reporttype={}, limit={:?})",
            urls.len(),
            report_type,
            self.settings.max_concurrency
        );

        // Collected eagerly so the returned future stays `Send` when spawned.
        let evaluations: Vec<_> = urls
            .iter()
            .map(|url| self.evaluator.evaluate(url, report_type))
            .collect();
        let outcomes = match self.settings.max_concurrency {
            None => join_all(evaluations).await,
            Some(limit) => stream::iter(evaluations).buffered(limit.get()).collect().await,
        };

        let batch = AggregateBatch::new(outcomes);
        relay_info!(
            "Fan-out settled: {} urls, {} failed",
            batch.len(),
            batch.failures()
        );
        batch
    }
}
