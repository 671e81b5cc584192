use bitflags::bitflags;

bitflags! {
    /// Interrupt-request lines the PPU shares with the interrupt controller.
    ///
    /// Bit positions match the machine's IF register so the bus dispatcher
    /// can OR these straight into it. The PPU only ever sets bits; clearing
    /// them is the interrupt controller's (or CPU's) job.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptLine: u8 {
        const VBLANK = 0b0000_0001;
        const LCD_STAT = 0b0000_0010;
    }
}

impl InterruptLine {
    /// Request the vertical-blank interrupt.
    #[inline]
    pub fn request_vblank(&mut self) {
        self.insert(InterruptLine::VBLANK);
    }

    /// Request the LCD-status interrupt.
    #[inline]
    pub fn request_lcd_stat(&mut self) {
        self.insert(InterruptLine::LCD_STAT);
    }

    /// Clear and return the pending requests.
    pub fn take(&mut self) -> InterruptLine {
        let pending = *self;
        *self = InterruptLine::empty();
        pending
    }
}
