use serde::Serialize;

/// Per-platform application install links for a wallet.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AppLinks {
    pub browser: Option<&'static str>,
    pub ios: Option<&'static str>,
    pub android: Option<&'static str>,
    pub mac: Option<&'static str>,
    pub windows: Option<&'static str>,
    pub linux: Option<&'static str>,
    pub chrome: Option<&'static str>,
    pub firefox: Option<&'static str>,
    pub safari: Option<&'static str>,
    pub edge: Option<&'static str>,
    pub opera: Option<&'static str>,
}

/// Deep-link entry points (native scheme and universal URL).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DeepLinks {
    pub native: Option<&'static str>,
    pub universal: Option<&'static str>,
}

/// Static metadata record for a known wallet, keyed by reverse-DNS id.
/// Defined at build time, read-only for the process lifetime.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WalletInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub homepage: &'static str,
    pub image_id: &'static str,
    pub rdns: Option<&'static str>,
    pub app: AppLinks,
    pub mobile: DeepLinks,
    pub desktop: DeepLinks,
}

pub const WALLETS: &[WalletInfo] = &[
    WalletInfo {
        id: "io.metamask",
        name: "MetaMask",
        homepage: "https://metamask.io/",
        image_id: "018b2d52-10e9-4158-1fde-a5d5bac5aa00",
        rdns: Some("io.metamask"),
        app: AppLinks {
            browser: None,
            ios: Some("https://apps.apple.com/us/app/metamask/id1438144202"),
            android: Some("https://play.google.com/store/apps/details?id=io.metamask"),
            mac: None,
            windows: None,
            linux: None,
            chrome: Some(
                "https://chrome.google.com/webstore/detail/metamask/nkbihfbeogaeaoehlefnkodbefgpgknn",
            ),
            firefox: Some("https://addons.mozilla.org/en-US/firefox/addon/ether-metamask/"),
            safari: None,
            edge: None,
            opera: None,
        },
        mobile: DeepLinks {
            native: Some("metamask://"),
            universal: Some("https://metamask.app.link"),
        },
        desktop: DeepLinks {
            native: None,
            universal: None,
        },
    },
    WalletInfo {
        id: "com.coinbase.wallet",
        name: "Coinbase Wallet",
        homepage: "https://www.coinbase.com/wallet/",
        image_id: "a5ebc364-8f91-4200-fcc6-be81310a0000",
        rdns: Some("com.coinbase.wallet"),
        app: AppLinks {
            browser: Some("https://go.cb-w.com/"),
            ios: Some("https://apps.apple.com/app/apple-store/id1278383455"),
            android: Some("https://play.google.com/store/apps/details?id=org.toshi"),
            mac: None,
            windows: None,
            linux: None,
            chrome: Some(
                "https://chrome.google.com/webstore/detail/coinbase-wallet-extension/hnfanknocfeofbddgcijnmhnfnkdnaad",
            ),
            firefox: None,
            safari: None,
            edge: None,
            opera: None,
        },
        mobile: DeepLinks {
            native: Some("cbwallet://"),
            universal: Some("https://go.cb-w.com/"),
        },
        desktop: DeepLinks {
            native: None,
            universal: None,
        },
    },
    WalletInfo {
        id: "net.newmoney",
        name: "New Money",
        homepage: "https://newmoney.net",
        image_id: "8d4b8dd1-247d-4cc6-973a-d21122b55700",
        rdns: None,
        app: AppLinks {
            browser: None,
            ios: None,
            android: Some(
                "https://play.google.com/store/apps/details?id=com.radstudio.newmoney",
            ),
            mac: None,
            windows: None,
            linux: None,
            chrome: Some(
                "https://chrome.google.com/webstore/detail/new-money/gpnfbmgdageboldhambihnbjdicbeojg",
            ),
            firefox: None,
            safari: None,
            edge: None,
            opera: None,
        },
        mobile: DeepLinks {
            native: Some("com.radstudio.newmoney://open"),
            universal: Some("https://app.newmoney.net/open"),
        },
        desktop: DeepLinks {
            native: None,
            universal: None,
        },
    },
];

/// Look up a wallet record by its id.
pub fn get_wallet_info(id: &str) -> Option<&'static WalletInfo> {
    WALLETS.iter().find(|w| w.id == id)
}

pub fn all_wallets() -> &'static [WalletInfo] {
    WALLETS
}
