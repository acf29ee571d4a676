use crate::backend::{Service, ServiceTask};

/// Messages sent from screen handlers and background tasks to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Redraw the screen; pending refreshes collapse into the next frame
    Refresh,
    /// A viewer opened by the services screen has been closed
    CloseView,

    // Service list data
    ReloadServices,
    ServicesLoaded(Vec<Service>),

    // Task screen
    ShowServiceTasks(String),
    ServiceTasksLoaded {
        service_id: String,
        tasks: Vec<ServiceTask>,
    },

    // App control
    Quit,
}
