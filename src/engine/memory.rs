//! Borrow-bounded views over engine shared memory.
//!
//! The engine hands out raw (pointer, length) pairs; any call into the
//! engine may relocate or resize the backing region and invalidate them.
//! [`BufferReader`] turns those pairs into slices whose lifetime is tied to
//! a shared borrow of the engine, so the borrow checker rules out holding a
//! view across the next `&mut` engine call. Data that must survive a call
//! boundary is copied out eagerly instead.

use super::{Engine, OrderStat, SeriesKind, Species};

/// View factory over one engine's shared memory.
///
/// Every accessor fetches the (pointer, length) pair fresh and returns a
/// slice borrowed for `'e`, the lifetime of the underlying engine borrow.
pub struct BufferReader<'e> {
    engine: &'e dyn Engine,
}

impl<'e> BufferReader<'e> {
    pub fn new(engine: &'e dyn Engine) -> Self {
        Self { engine }
    }

    /// Scalar telemetry series, one element per completed temperature step.
    pub fn series(&self, kind: SeriesKind) -> &'e [f32] {
        let len = self.engine.log_len() as usize;
        let ptr = self.engine.series_ptr(kind);
        // SAFETY: the Engine contract guarantees `ptr` is valid for
        // `log_len()` reads until the next `&mut` engine call, which cannot
        // happen while this `&'e` borrow is live.
        unsafe { slice_or_empty(ptr, len) }
    }

    /// Cluster-size order statistic series for one species.
    pub fn cluster_stat(&self, species: Species, stat: OrderStat) -> &'e [u32] {
        let len = self.engine.log_len() as usize;
        let ptr = self.engine.cluster_stat_ptr(species, stat);
        // SAFETY: as for `series`.
        unsafe { slice_or_empty(ptr, len) }
    }

    /// The full animation buffer, `[frame][row][col]` row-major.
    pub fn animation(&self) -> &'e [u8] {
        let len = (self.engine.width() * self.engine.height() * self.engine.anim_len()) as usize;
        let ptr = self.engine.anim_ptr();
        // SAFETY: the Engine contract guarantees the animation buffer holds
        // `width * height * anim_len` bytes.
        unsafe { slice_or_empty(ptr, len) }
    }

    /// The lattice state at the start of the most recent step (live view).
    pub fn start_frame(&self) -> &'e [u8] {
        let len = (self.engine.width() * self.engine.height()) as usize;
        let ptr = self.engine.start_frame_ptr();
        // SAFETY: the Engine contract guarantees one frame of
        // `width * height` bytes.
        unsafe { slice_or_empty(ptr, len) }
    }

    /// One recorded frame of the animation buffer.
    ///
    /// # Panics
    ///
    /// Panics if `frame >= anim_len()`.
    pub fn frame(&self, frame: u32) -> &'e [u8] {
        let anim_len = self.engine.anim_len();
        assert!(frame < anim_len, "frame {frame} out of range ({anim_len})");
        let len = (self.engine.width() * self.engine.height()) as usize;
        let ptr = self.engine.frame_ptr(frame);
        // SAFETY: `frame < anim_len` was checked above; the Engine contract
        // guarantees one frame of `width * height` bytes at this pointer.
        unsafe { slice_or_empty(ptr, len) }
    }

    /// The complete encoded animation image.
    pub fn encoded_image(&self) -> &'e [u8] {
        let len = self.engine.gif_len() as usize;
        let ptr = self.engine.gif_ptr();
        // SAFETY: the Engine contract guarantees `gif_len()` bytes.
        unsafe { slice_or_empty(ptr, len) }
    }

    /// The synthesized archive, if one is currently materialized.
    pub fn archive(&self) -> Option<&'e [u8]> {
        let len = self.engine.zip_len() as usize;
        if len == 0 {
            return None;
        }
        let ptr = self.engine.zip_ptr();
        // SAFETY: zip_len > 0, so the Engine contract guarantees a live
        // archive buffer of that many bytes.
        Some(unsafe { slice_or_empty(ptr, len) })
    }
}

/// Build a slice from a raw pair, tolerating the null-pointer/zero-length
/// encoding for absent buffers.
///
/// # Safety
///
/// When `len > 0`, `ptr` must be valid for `len` reads for the duration of
/// the returned borrow.
unsafe fn slice_or_empty<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 || ptr.is_null() {
        return &[];
    }
    std::slice::from_raw_parts(ptr, len)
}
