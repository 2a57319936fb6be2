use crate::{PageRequest, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage(PageRequest),
    /// The request was superseded; its response will be ignored either way.
    CancelFetch { request_id: RequestId },
}
