//! Page patches applied after each load when the stealth engine is selected.
//!
//! They hide the `navigator.webdriver` flag and chromedriver globals, and
//! present a Spanish-speaking desktop Chrome to the portal.

pub const STEALTH_SCRIPTS: &[&str] = &[
    // Remove webdriver property
    r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true
    });
    "#,
    // Fix chrome object
    r#"
    window.chrome = window.chrome || {
        runtime: {},
        loadTimes: function() {},
        csi: function() {},
        app: {}
    };
    "#,
    // The portal serves Ecuadorian Spanish; match a local visitor
    r#"
    Object.defineProperty(navigator, 'languages', {
        get: () => ['es-EC', 'es', 'en'],
        configurable: true
    });
    "#,
    // Remove automation-related properties
    r#"
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Array;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Promise;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Symbol;
    "#,
];
