//! Connection bring-up gates
//!
//! Bring-up passes through a fixed sequence of gates. The render sink shows
//! the first one still closed, so the operator can tell a WiFi problem from
//! a broker problem at a glance.

/// One step of connection bring-up, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    Wifi,
    Tls,
    Transport,
    Connected,
    Subscribed,
    Published,
}

impl Gate {
    /// All gates in bring-up order
    pub const ALL: [Gate; 6] = [
        Gate::Wifi,
        Gate::Tls,
        Gate::Transport,
        Gate::Connected,
        Gate::Subscribed,
        Gate::Published,
    ];

    /// Label shown while this gate is the one being worked on
    pub fn pending_label(&self) -> &'static str {
        match self {
            Gate::Wifi => "Joining WiFi",
            Gate::Tls => "Loading certificates",
            Gate::Transport => "Starting transport",
            Gate::Connected => "Connecting",
            Gate::Subscribed => "Subscribing",
            Gate::Published => "Publishing",
        }
    }
}

/// Bring-up progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionStatus {
    pub wifi: bool,
    pub tls: bool,
    pub transport: bool,
    pub connected: bool,
    pub subscribed: bool,
    pub published: bool,
}

impl ConnectionStatus {
    /// Check one gate
    pub fn is_open(&self, gate: Gate) -> bool {
        match gate {
            Gate::Wifi => self.wifi,
            Gate::Tls => self.tls,
            Gate::Transport => self.transport,
            Gate::Connected => self.connected,
            Gate::Subscribed => self.subscribed,
            Gate::Published => self.published,
        }
    }

    /// Open or close one gate
    pub fn set(&mut self, gate: Gate, open: bool) {
        let slot = match gate {
            Gate::Wifi => &mut self.wifi,
            Gate::Tls => &mut self.tls,
            Gate::Transport => &mut self.transport,
            Gate::Connected => &mut self.connected,
            Gate::Subscribed => &mut self.subscribed,
            Gate::Published => &mut self.published,
        };
        *slot = open;
    }

    /// First gate still closed
    pub fn first_closed(&self) -> Option<Gate> {
        Gate::ALL.into_iter().find(|gate| !self.is_open(*gate))
    }

    /// Every gate is open
    pub fn overall_connected(&self) -> bool {
        self.first_closed().is_none()
    }

    /// Short description of where bring-up stands
    pub fn phase_label(&self) -> &'static str {
        self.first_closed()
            .map(|gate| gate.pending_label())
            .unwrap_or("Connected")
    }

    /// Close the session gates after a transport failure
    ///
    /// The link and credentials are kept; only the broker session is lost.
    pub fn drop_session(&mut self) {
        self.connected = false;
        self.subscribed = false;
        self.published = false;
    }
}
