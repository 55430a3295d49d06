// CONVERSION LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_conversions")]
macro_rules! conversion_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_conversions"))]
macro_rules! conversion_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// OPERATOR LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_operators")]
macro_rules! operator_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_operators"))]
macro_rules! operator_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// HOISTING LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_hoisting")]
macro_rules! hoist_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_hoisting"))]
macro_rules! hoist_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// Extra timer logging
#[macro_export]
#[cfg(feature = "detailed_timers")]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        saying::say!($msg, Green #$time.elapsed());
    };
}

#[macro_export]
#[cfg(not(feature = "detailed_timers"))]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        // Nothing
    };
}
