#![no_main]

use libfuzzer_sys::fuzz_target;
use zenbridge::{Envelope, EnvelopeError};

fuzz_target!(|data: &[u8]| {
    // Декодер не должен паниковать ни на каких входных данных.
    match Envelope::decode(data) {
        Ok(envelope) => {
            // Успешно декодированный конверт кодируется и читается обратно без потерь.
            let encoded = envelope.encode();
            let again = Envelope::decode(&encoded).expect("re-encoded envelope must decode");
            assert_eq!(again, envelope);
        }
        Err(EnvelopeError::EmptyInput) => assert!(data.is_empty()),
        Err(_) => {}
    }
});
