use std::fmt;

const MOBILE_KEYWORDS: [&str; 7] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "windows phone",
];

/// Counter bucket. `Web` counts every visit; `Mobile`/`Desktop` split them by device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Web,
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Web => "web",
            DeviceClass::Mobile => "mobile",
            DeviceClass::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a user agent. `None` when there is no user agent to look at.
pub fn classify_user_agent(user_agent: Option<&str>) -> Option<DeviceClass> {
    let ua = user_agent.map(str::trim).filter(|s| !s.is_empty())?;
    let ua = ua.to_lowercase();
    if MOBILE_KEYWORDS.iter().any(|k| ua.contains(k)) {
        Some(DeviceClass::Mobile)
    } else {
        Some(DeviceClass::Desktop)
    }
}
