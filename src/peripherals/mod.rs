//! PineTime peripherals used by the watchface

pub mod display;
