//! Транспорт: доставка образцов, запросов и ответов конечным точкам.
//!
//! [`LoopbackSession`] связывает конечные точки внутри одного процесса и
//! используется демонстрационным бинарником и интеграционными тестами.

mod loopback;

pub use loopback::{LoopbackSession, Query, QueryCallback, SampleCallback};
