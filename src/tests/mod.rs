mod test_network;
mod test_noise;
mod test_optimizer;
