#![no_main]

use std::collections::VecDeque;

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use zenbridge::{Envelope, Gid, MessageQueue};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(i64),
    Pop,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: FuzzInput| {
    let capacity = usize::from(input.capacity.max(1));
    let mut queue = MessageQueue::with_capacity(capacity).expect("non-zero capacity");
    let mut model = VecDeque::new();

    for op in input.ops {
        match op {
            Op::Push(seq) => {
                let evicted = queue.push(Envelope::new(seq, 0, Gid::default()), Bytes::new());
                let expected = (model.len() == capacity).then(|| model.pop_front()).flatten();
                model.push_back(seq);
                assert_eq!(evicted.map(|m| m.envelope.sequence_number), expected);
            }
            Op::Pop => {
                assert_eq!(
                    queue.pop_front().ok().map(|m| m.envelope.sequence_number),
                    model.pop_front()
                );
            }
            Op::Clear => {
                queue.clear();
                model.clear();
            }
        }
        assert_eq!(queue.len(), model.len());
    }
});
