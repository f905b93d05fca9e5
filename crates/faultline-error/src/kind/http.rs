use super::KindGroup;

kind_enum!(
    /// Generic HTTP-aligned failure categories.
    ///
    /// Each value owns exactly one status code, so [`HttpKind::from_http_code`]
    /// is the inverse of [`HttpKind::http_code`]. 521..=524 are the
    /// non-standard "origin down" codes used by edge proxies.
    HttpKind => Http, KindGroup::Http, {
        BadRequest => ("bad_request", 400),
        Unauthorized => ("unauthorized", 401),
        PaymentRequired => ("payment_required", 402),
        Forbidden => ("forbidden", 403),
        NotExist => ("not_exist", 404),
        MethodNotAllowed => ("method_not_allowed", 405),
        NotAcceptable => ("not_acceptable", 406),
        ProxyAuthRequired => ("proxy_auth_required", 407),
        RequestTimeout => ("request_timeout", 408),
        Conflict => ("conflict", 409),
        Gone => ("gone", 410),
        LengthRequired => ("length_required", 411),
        PreconditionFailed => ("precondition_failed", 412),
        PayloadTooLarge => ("payload_too_large", 413),
        UriTooLong => ("uri_too_long", 414),
        UnsupportedMediaType => ("unsupported_media_type", 415),
        RangeNotSatisfiable => ("range_not_satisfiable", 416),
        ExpectationFailed => ("expectation_failed", 417),
        Teapot => ("im_a_teapot", 418),
        MisdirectedRequest => ("misdirected_request", 421),
        BadValidation => ("bad_validation", 422),
        Locked => ("locked", 423),
        FailedDependency => ("failed_dependency", 424),
        TooEarly => ("too_early", 425),
        UpgradeRequired => ("upgrade_required", 426),
        PreconditionRequired => ("precondition_required", 428),
        TooManyRequests => ("too_many_requests", 429),
        RequestHeaderFieldsTooLarge => ("request_header_fields_too_large", 431),
        UnavailableForLegalReasons => ("unavailable_for_legal_reasons", 451),
        #[default]
        Other => ("other_error", 500),
        NotImplemented => ("not_implemented", 501),
        BadGateway => ("bad_gateway", 502),
        ServiceUnavailable => ("service_unavailable", 503),
        GatewayTimeout => ("gateway_timeout", 504),
        HttpVersionNotSupported => ("http_version_not_supported", 505),
        VariantAlsoNegotiates => ("variant_also_negotiates", 506),
        InsufficientStorage => ("insufficient_storage", 507),
        LoopDetected => ("loop_detected", 508),
        NotExtended => ("not_extended", 510),
        NetworkAuthRequired => ("network_auth_required", 511),
        WebServerDown => ("web_server_down", 521),
        ConnectionTimedOut => ("connection_timed_out", 522),
        OriginUnreachable => ("origin_unreachable", 523),
        TimeoutOccurred => ("timeout_occurred", 524),
    }
);

impl HttpKind {
    /// Kind owning `code`; codes without a kind map to [`HttpKind::Other`].
    pub fn from_http_code(code: u16) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.http_code() == code)
            .unwrap_or_default()
    }

    pub const fn is_client_error(&self) -> bool {
        matches!(self.http_code(), 400..=499)
    }

    pub const fn is_server_error(&self) -> bool {
        matches!(self.http_code(), 500..=599)
    }
}
