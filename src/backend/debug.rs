// Diagnostic sinks for validation layer output
//
// Shader debugPrintfEXT (GLSL) and printf (HLSL) strings come back through
// the validation layer on both VK_EXT_debug_utils and VK_EXT_debug_report.
// Each sink gets its own callback; both print one line to stdout per message.

use ash::vk;
use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr};
use std::io::Write;

/// Which messages the sinks let through. Shared with both callbacks via
/// `p_user_data`, so it must outlive the messenger and report callback.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    /// Only validation-category messages, which is where debug printf lands
    pub show_only_debug_printf: bool,
    /// Extra substring a report message must contain when filtering
    pub report_message_contains: Option<String>,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            show_only_debug_printf: true,
            report_message_contains: None,
        }
    }
}

impl MessageFilter {
    pub fn accepts_debug(&self, message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> bool {
        !self.show_only_debug_printf || message_type == vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
    }

    pub fn accepts_report(&self, flags: vk::DebugReportFlagsEXT, message: &str) -> bool {
        if !self.show_only_debug_printf {
            return true;
        }
        if flags != vk::DebugReportFlagsEXT::INFORMATION {
            return false;
        }
        match &self.report_message_contains {
            Some(needle) => message.contains(needle.as_str()),
            None => true,
        }
    }
}

/// Fixed-width severity tag
pub fn severity_label(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> &'static str {
    match severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => "[VERBOSE]",
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => "[INFO]   ",
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => "[WARNING]",
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => "[ERROR]  ",
        _ => "[UNKNOWN]",
    }
}

pub fn format_debug_line(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    message: &str,
) -> String {
    format!(
        "[VULKAN DEBUG] : {} : [FLAGS]: {}\t{}",
        severity_label(severity),
        message_type.as_raw(),
        message
    )
}

pub fn format_report_line(flags: vk::DebugReportFlagsEXT, layer: &str, message: &str) -> String {
    format!(
        "[VULKAN REPORT]: [FLAGS]: {} [LAYER]: {} [MESSAGE]: {}",
        flags.as_raw(),
        layer,
        message
    )
}

/// Messenger create info: every severity and category reaches the callback,
/// filtering happens there.
pub fn messenger_create_info(
    filter: &MessageFilter,
) -> vk::DebugUtilsMessengerCreateInfoEXTBuilder<'_> {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .user_data(filter as *const MessageFilter as *mut c_void)
}

pub fn report_create_info(filter: &MessageFilter) -> vk::DebugReportCallbackCreateInfoEXTBuilder<'_> {
    vk::DebugReportCallbackCreateInfoEXT::builder()
        .flags(
            vk::DebugReportFlagsEXT::DEBUG
                | vk::DebugReportFlagsEXT::ERROR
                | vk::DebugReportFlagsEXT::PERFORMANCE_WARNING
                | vk::DebugReportFlagsEXT::WARNING
                | vk::DebugReportFlagsEXT::INFORMATION,
        )
        .pfn_callback(Some(report_callback))
        .user_data(filter as *const MessageFilter as *mut c_void)
}

/// Write one sink line. Callbacks run inside the driver and must not panic,
/// so a failed write (closed pipe, full disk) drops the line.
pub fn emit_line<W: Write>(out: &mut W, line: &str) -> bool {
    writeln!(out, "{}", line).and_then(|_| out.flush()).is_ok()
}

unsafe fn lossy<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

unsafe fn filter_from<'a>(p_user_data: *mut c_void) -> Cow<'a, MessageFilter> {
    match (p_user_data as *const MessageFilter).as_ref() {
        Some(filter) => Cow::Borrowed(filter),
        None => Cow::Owned(MessageFilter::default()),
    }
}

// Messenger callback (VK_EXT_debug_utils)
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    if !filter_from(p_user_data).accepts_debug(message_type) {
        return vk::FALSE;
    }

    let message = match p_callback_data.as_ref() {
        Some(data) => lossy(data.p_message),
        None => Cow::Borrowed(""),
    };

    let line = format_debug_line(message_severity, message_type, &message);
    emit_line(&mut std::io::stdout().lock(), &line);

    vk::FALSE
}

// Report callback (VK_EXT_debug_report)
#[allow(clippy::too_many_arguments)]
unsafe extern "system" fn report_callback(
    flags: vk::DebugReportFlagsEXT,
    _object_type: vk::DebugReportObjectTypeEXT,
    _object: u64,
    _location: usize,
    _message_code: i32,
    p_layer_prefix: *const c_char,
    p_message: *const c_char,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    let message = lossy(p_message);

    if !filter_from(p_user_data).accepts_report(flags, &message) {
        return vk::FALSE;
    }

    let line = format_report_line(flags, &lossy(p_layer_prefix), &message);
    emit_line(&mut std::io::stdout().lock(), &line);

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_labels_are_padded_to_one_width() {
        let severities = [
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        ];
        for severity in severities {
            assert_eq!(severity_label(severity).len(), 9);
        }
        assert_eq!(
            severity_label(vk::DebugUtilsMessageSeverityFlagsEXT::INFO),
            "[INFO]   "
        );
    }

    #[test]
    fn debug_line_layout() {
        let line = format_debug_line(
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
            "GLSL thread 3",
        );
        assert_eq!(line, "[VULKAN DEBUG] : [INFO]    : [FLAGS]: 2\tGLSL thread 3");
    }

    #[test]
    fn report_line_layout() {
        let line = format_report_line(
            vk::DebugReportFlagsEXT::INFORMATION,
            "Validation",
            "HLSL thread 7",
        );
        assert_eq!(
            line,
            "[VULKAN REPORT]: [FLAGS]: 1 [LAYER]: Validation [MESSAGE]: HLSL thread 7"
        );
    }

    #[test]
    fn default_filter_keeps_only_validation_messages() {
        let filter = MessageFilter::default();
        assert!(filter.accepts_debug(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION));
        assert!(!filter.accepts_debug(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL));
        assert!(!filter.accepts_debug(
            vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
        ));

        assert!(filter.accepts_report(vk::DebugReportFlagsEXT::INFORMATION, "anything"));
        assert!(!filter.accepts_report(vk::DebugReportFlagsEXT::WARNING, "anything"));
    }

    #[test]
    fn report_substring_narrows_information_messages() {
        let filter = MessageFilter {
            show_only_debug_printf: true,
            report_message_contains: Some("Validation".to_string()),
        };
        assert!(filter.accepts_report(
            vk::DebugReportFlagsEXT::INFORMATION,
            "Validation Information: GLSL thread 0"
        ));
        assert!(!filter.accepts_report(vk::DebugReportFlagsEXT::INFORMATION, "loader message"));
    }

    #[test]
    fn unfiltered_sinks_accept_everything() {
        let filter = MessageFilter {
            show_only_debug_printf: false,
            report_message_contains: Some("never matched".to_string()),
        };
        assert!(filter.accepts_debug(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE));
        assert!(filter.accepts_report(vk::DebugReportFlagsEXT::ERROR, "loader message"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn emit_line_writes_one_terminated_line() {
        let mut out = Vec::new();
        assert!(emit_line(&mut out, "[VULKAN REPORT]: [FLAGS]: 1"));
        assert_eq!(out, b"[VULKAN REPORT]: [FLAGS]: 1\n");
    }

    #[test]
    fn emit_line_drops_the_line_on_a_closed_pipe() {
        assert!(!emit_line(&mut BrokenPipe, "GLSL thread 0"));
    }

    #[test]
    fn accepted_report_message_is_printed_without_panicking() {
        let filter = MessageFilter::default();
        let ret = unsafe {
            report_callback(
                vk::DebugReportFlagsEXT::INFORMATION,
                vk::DebugReportObjectTypeEXT::UNKNOWN,
                0,
                0,
                0,
                c"Validation".as_ptr(),
                c"Validation Information: GLSL thread 0".as_ptr(),
                &filter as *const MessageFilter as *mut c_void,
            )
        };
        assert_eq!(ret, vk::FALSE);
    }

    #[test]
    fn callbacks_tolerate_missing_user_data_and_strings() {
        let ret = unsafe {
            report_callback(
                vk::DebugReportFlagsEXT::WARNING,
                vk::DebugReportObjectTypeEXT::UNKNOWN,
                0,
                0,
                0,
                std::ptr::null(),
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(ret, vk::FALSE);

        let ret = unsafe {
            debug_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(ret, vk::FALSE);
    }
}
