/// One sampled, compressed frame.
///
/// Produced by the encoder loop, consumed exactly once by the transport
/// worker; terminal on successful send or drop. Only `payload` crosses the
/// wire — the rest is process-side bookkeeping.
#[derive(Clone, Debug)]
pub struct Frame {
    pub session_id: u64,
    /// Strictly increasing from 1 within a session; never reused, even for
    /// frames dropped at the transport queue.
    pub seq: u64,
    /// JPEG bytes.
    pub payload: Vec<u8>,
    /// Capture wall-clock time, milliseconds since the Unix epoch.
    pub captured_at_ms: u64,
}
