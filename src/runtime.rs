use std::collections::VecDeque;

use crate::client::{DatasetClient, ReferencesClient};
use crate::navigation::History;
use crate::page::Page;
use crate::switcher::{Completion, Effect};

#[derive(Clone)]
pub struct Runtime<D: DatasetClient, R: ReferencesClient> {
    datasets: D,
    references: R,
}

impl<D: DatasetClient, R: ReferencesClient> Runtime<D, R> {
    pub fn new(datasets: D, references: R) -> Self {
        Self {
            datasets,
            references,
        }
    }

    pub fn execute(&self, effect: Effect) -> Completion {
        match effect {
            Effect::FetchDataset(ticket) => {
                let result = self.datasets.fetch_dataset(&ticket.location);
                Completion::Dataset { ticket, result }
            }
            Effect::LookupPublications(ticket) => {
                let result = self.references.lookup(&ticket.pubmed_ids);
                Completion::Publications { ticket, result }
            }
        }
    }

    pub fn drive<H: History>(&self, page: &mut Page<H>, effect: Option<Effect>) {
        let mut queue = effect.into_iter().collect::<VecDeque<_>>();
        while let Some(effect) = queue.pop_front() {
            let completion = self.execute(effect);
            queue.extend(page.complete(completion));
        }
    }
}
