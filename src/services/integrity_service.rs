/// Warning shown to the student on the first hidden-tab transition.
pub const TAB_WARNING: &str =
    "Anda terdeteksi meninggalkan tab ujian. Harap tetap fokus pada pengerjaan ujian.";

/// Advisory shown on an unload attempt while the session is live. Browser
/// level only, never enforced server-side.
pub const UNLOAD_WARNING: &str =
    "Perubahan mungkin tidak tersimpan. Apakah Anda yakin ingin keluar?";

/// Hidden-tab warning latch for one session. The warning (and its audit
/// signal) is raised on the first transition to hidden; repeated
/// hidden/visible cycles stay silent until the student acknowledges the
/// warning, after which a new hidden transition raises it again.
#[derive(Debug, Default)]
pub struct IntegrityMonitor {
    warning_pending: bool,
}

impl IntegrityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this hidden transition should surface the warning
    /// and raise the audit signal.
    pub fn visibility_hidden(&mut self) -> bool {
        if self.warning_pending {
            return false;
        }
        self.warning_pending = true;
        true
    }

    pub fn acknowledge_warning(&mut self) {
        self.warning_pending = false;
    }

    pub fn warning_pending(&self) -> bool {
        self.warning_pending
    }
}
