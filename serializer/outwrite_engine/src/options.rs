bitflags::bitflags! {
    /// Formatting flags read by the encoders.
    ///
    /// An [`crate::Engine`] stores the raw bitmask; bits with no meaning here
    /// are dropped when the flags are read back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u32 {
        /// Indents JSON, native and markup output.
        const PRETTY_PRINT = 1;

        /// Encodes JSON sequences as objects keyed by position.
        const FORCE_OBJECT = 1 << 1;

        /// Ends tabular lines with `\r\n` instead of `\n`.
        const CRLF = 1 << 2;

        /// Omits the header line of tabular output.
        const NO_HEADER = 1 << 3;
    }
}
